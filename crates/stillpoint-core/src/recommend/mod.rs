//! Practice recommendations.
//!
//! Two entry points share one pattern profile per call:
//!
//! - [`RecommendationEngine::recommend`] walks an ordered policy
//!   (favorite, routine, mood, time of day) and returns a single pick.
//! - [`RecommendationEngine::top_recommendations`] layers that pick with the
//!   time-of-day default, favorites, the best mood lifter and catalog filler
//!   into a de-duplicated list.
//!
//! Both are pure: the same `(now, history, catalog)` always yields the same
//! output, and ids that no longer resolve in the catalog are never returned.

mod engine;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use engine::RecommendationEngine;

/// Why an activity was suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    /// Strong favorite from history
    History,
    /// Matches the user's usual time of day
    Routine,
    /// Correlated with mood improvement
    Mood,
    /// Default for the current time of day
    Time,
    /// One of the user's most completed activities
    Favorite,
    /// Catalog filler
    Explore,
}

impl RecommendationCategory {
    pub fn label(self) -> &'static str {
        match self {
            RecommendationCategory::History => "history",
            RecommendationCategory::Routine => "routine",
            RecommendationCategory::Mood => "mood",
            RecommendationCategory::Time => "time",
            RecommendationCategory::Favorite => "favorite",
            RecommendationCategory::Explore => "explore",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A suggested activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub activity_id: String,
    /// Canonical English justification
    pub reason: String,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub category: RecommendationCategory,
    pub is_primary: bool,
}

impl Recommendation {
    /// Create a non-primary recommendation. Confidence is clamped to [0, 1].
    pub fn new(
        activity_id: impl Into<String>,
        reason: impl Into<String>,
        confidence: f64,
        category: RecommendationCategory,
    ) -> Self {
        Self {
            activity_id: activity_id.into(),
            reason: reason.into(),
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
            category,
            is_primary: false,
        }
    }

    pub fn into_primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

//! Recommendation engine implementation.
//!
//! Holds a read-only catalog and the engine tunables. Every call builds a
//! fresh [`PatternProfile`] from the history it is given.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Timelike};

use super::{Recommendation, RecommendationCategory};
use crate::catalog::CatalogAccessor;
use crate::config::EngineConfig;
use crate::error::{Result, ValidationError};
use crate::history::HistoryEntry;
use crate::patterns::{most_recent_entry, PatternAnalyzer, PatternProfile};
use crate::time_bucket::{is_appropriate_for_time, TimeBucket};

/// Stateless recommendation engine over an injected catalog.
#[derive(Debug, Clone)]
pub struct RecommendationEngine<C> {
    catalog: C,
    config: EngineConfig,
}

impl<C: CatalogAccessor> RecommendationEngine<C> {
    /// Create an engine with default tunables.
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: C, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Pattern profile using this engine's favorites limit.
    pub fn analyze(&self, history: &[HistoryEntry]) -> PatternProfile {
        PatternAnalyzer::with_favorites_limit(self.config.favorites_limit).analyze(history)
    }

    /// The single best activity for `now`.
    ///
    /// Returns `None` only when nothing resolves, e.g. an empty catalog or a
    /// stale time-of-day default with no personal signal to fall back on.
    pub fn recommend(
        &self,
        now: DateTime<FixedOffset>,
        history: &[HistoryEntry],
    ) -> Option<Recommendation> {
        let profile = self.analyze(history);
        self.primary(now, history, &profile)
    }

    /// Ranked, de-duplicated list of at most `limit` activities.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `limit` is zero.
    pub fn top_recommendations(
        &self,
        now: DateTime<FixedOffset>,
        history: &[HistoryEntry],
        limit: usize,
    ) -> Result<Vec<Recommendation>> {
        if limit == 0 {
            return Err(ValidationError::InvalidArgument {
                field: "limit".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }

        if self.catalog.list_all().is_empty() {
            tracing::debug!("catalog is empty, no recommendations");
            return Ok(Vec::new());
        }

        let hour = now.hour();
        let bucket = TimeBucket::from_hour(hour);
        let profile = self.analyze(history);
        let mut list = RankedList::new(&self.catalog, limit);

        if let Some(primary) = self.primary(now, history, &profile) {
            list.push(primary);
        }

        if let Some(id) = self.time_default(bucket) {
            list.push(Recommendation::new(
                id,
                format!("Recommended for the {bucket}"),
                self.config.default_confidence,
                RecommendationCategory::Time,
            ));
        }

        for favorite in &profile.favorite_activities {
            if list.is_full() {
                break;
            }
            list.push(Recommendation::new(
                favorite.activity_id.as_str(),
                format!("You've loved this {}x", favorite.count),
                self.config.favorite_list_confidence,
                RecommendationCategory::Favorite,
            ));
        }

        if !list.is_full() && !profile.mood_correlations.is_empty() {
            if let Some((id, _)) = profile.best_mood_activity(|id| self.catalog.contains(id)) {
                list.push(Recommendation::new(
                    id,
                    "Great for your mood",
                    self.config.mood_confidence,
                    RecommendationCategory::Mood,
                ));
            }
        }

        for activity in self.catalog.list_all() {
            if list.is_full() {
                break;
            }
            let reason = if is_appropriate_for_time(&self.catalog, &activity.id, hour) {
                "Perfect for now"
            } else {
                "Try something new"
            };
            list.push(Recommendation::new(
                activity.id.as_str(),
                reason,
                self.config.explore_confidence,
                RecommendationCategory::Explore,
            ));
        }

        let recommendations = list.into_vec();
        tracing::debug!(
            limit,
            returned = recommendations.len(),
            "ranked recommendations assembled"
        );
        Ok(recommendations)
    }

    /// Ordered decision policy; the first branch that yields a resolvable
    /// activity wins.
    fn primary(
        &self,
        now: DateTime<FixedOffset>,
        history: &[HistoryEntry],
        profile: &PatternProfile,
    ) -> Option<Recommendation> {
        let hour = now.hour();
        let bucket = TimeBucket::from_hour(hour);
        let time_default = self.time_default(bucket);

        if profile.is_empty() {
            return time_default.map(|id| {
                Recommendation::new(
                    id,
                    format!("Recommended for the {bucket}"),
                    self.config.baseline_confidence,
                    RecommendationCategory::Time,
                )
                .into_primary()
            });
        }

        if let Some(favorite) = profile.top_favorite() {
            let strong = favorite.count >= self.config.strong_favorite_min_count;
            let fits = favorite.count >= self.config.favorite_override_count
                || is_appropriate_for_time(&self.catalog, &favorite.activity_id, hour);

            if strong && fits && self.catalog.contains(&favorite.activity_id) {
                let confidence =
                    (favorite.count as f64 / 10.0).min(self.config.favorite_confidence_cap);
                return Some(
                    Recommendation::new(
                        favorite.activity_id.as_str(),
                        format!("Your favorite, completed {}x", favorite.count),
                        confidence,
                        RecommendationCategory::History,
                    )
                    .into_primary(),
                );
            }
            if strong && !self.catalog.contains(&favorite.activity_id) {
                tracing::debug!(activity_id = %favorite.activity_id, "favorite no longer in catalog");
            }
        }

        if profile.total_entries >= self.config.routine_min_entries
            && profile.favorite_time_bucket == Some(bucket)
        {
            if let Some(id) = time_default {
                return Some(
                    Recommendation::new(
                        id,
                        format!("You usually practice in the {bucket}"),
                        self.config.routine_confidence,
                        RecommendationCategory::Routine,
                    )
                    .into_primary(),
                );
            }
        }

        let mood_reported = most_recent_entry(history)
            .and_then(|entry| entry.pre_mood)
            .is_some();
        if mood_reported {
            if let Some((id, correlation)) =
                profile.best_mood_activity(|id| self.catalog.contains(id))
            {
                return Some(
                    Recommendation::new(
                        id,
                        format!(
                            "Lifted your mood by {:.1} on average",
                            correlation.average_improvement
                        ),
                        self.config.mood_confidence,
                        RecommendationCategory::Mood,
                    )
                    .into_primary(),
                );
            }
        }

        time_default.map(|id| {
            Recommendation::new(
                id,
                format!("Recommended for the {bucket}"),
                self.config.default_confidence,
                RecommendationCategory::Time,
            )
            .into_primary()
        })
    }

    /// The catalog's default for `bucket`, if it still resolves.
    fn time_default(&self, bucket: TimeBucket) -> Option<&str> {
        let id = self.catalog.default_activity_for(bucket)?;
        if self.catalog.contains(id) {
            Some(id)
        } else {
            tracing::warn!(%bucket, activity_id = id, "time-of-day default is not in catalog");
            None
        }
    }
}

/// Output list that only accepts unseen, resolvable ids while it has room.
struct RankedList<'a, C> {
    catalog: &'a C,
    limit: usize,
    seen: HashSet<String>,
    items: Vec<Recommendation>,
}

impl<'a, C: CatalogAccessor> RankedList<'a, C> {
    fn new(catalog: &'a C, limit: usize) -> Self {
        Self {
            catalog,
            limit,
            seen: HashSet::new(),
            items: Vec::with_capacity(limit.min(64)),
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    fn push(&mut self, recommendation: Recommendation) -> bool {
        if self.is_full()
            || self.seen.contains(&recommendation.activity_id)
            || !self.catalog.contains(&recommendation.activity_id)
        {
            return false;
        }
        self.seen.insert(recommendation.activity_id.clone());
        self.items.push(recommendation);
        true
    }

    fn into_vec(self) -> Vec<Recommendation> {
        self.items
    }
}

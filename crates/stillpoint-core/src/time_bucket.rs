//! Time-of-day buckets and the time-appropriateness check.
//!
//! Hours map onto five fixed, half-open ranges:
//!
//! | Bucket | Hours |
//! |--------|-------|
//! | Morning | 05:00 - 10:59 |
//! | Midday | 11:00 - 14:59 |
//! | Afternoon | 15:00 - 17:59 |
//! | Evening | 18:00 - 21:59 |
//! | Night | 22:00 - 04:59 |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogAccessor;

/// Part of the day a practice happens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    /// All buckets in enumeration order. Histogram ties resolve to the earliest entry.
    pub const ALL: [TimeBucket; 5] = [
        TimeBucket::Morning,
        TimeBucket::Midday,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    /// Classify an hour of day. Values past 23 wrap around.
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            5..=10 => TimeBucket::Morning,
            11..=14 => TimeBucket::Midday,
            15..=17 => TimeBucket::Afternoon,
            18..=21 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    /// Position in [`TimeBucket::ALL`].
    pub fn index(self) -> usize {
        match self {
            TimeBucket::Morning => 0,
            TimeBucket::Midday => 1,
            TimeBucket::Afternoon => 2,
            TimeBucket::Evening => 3,
            TimeBucket::Night => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Midday => "midday",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }

    /// Catalog tags that count as a match for this bucket.
    pub fn associated_tags(self) -> [TimeTag; 2] {
        let own = match self {
            TimeBucket::Morning => TimeTag::Morning,
            TimeBucket::Midday => TimeTag::Midday,
            TimeBucket::Afternoon => TimeTag::Afternoon,
            TimeBucket::Evening => TimeTag::Evening,
            TimeBucket::Night => TimeTag::Night,
        };
        [own, TimeTag::Anytime]
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time-of-day tag declared on a catalog activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeTag {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
    Anytime,
}

impl TimeTag {
    pub fn label(self) -> &'static str {
        match self {
            TimeTag::Morning => "morning",
            TimeTag::Midday => "midday",
            TimeTag::Afternoon => "afternoon",
            TimeTag::Evening => "evening",
            TimeTag::Night => "night",
            TimeTag::Anytime => "anytime",
        }
    }
}

/// Free-function form of [`TimeBucket::from_hour`].
pub fn get_time_bucket(hour: u32) -> TimeBucket {
    TimeBucket::from_hour(hour)
}

/// Whether the catalog tags `activity_id` as suitable for `hour`.
///
/// Unknown ids and activities without any time tags are never appropriate.
pub fn is_appropriate_for_time<C>(catalog: &C, activity_id: &str, hour: u32) -> bool
where
    C: CatalogAccessor + ?Sized,
{
    let Some(activity) = catalog.lookup(activity_id) else {
        return false;
    };
    TimeBucket::from_hour(hour)
        .associated_tags()
        .iter()
        .any(|tag| activity.time_tags.contains(tag))
}

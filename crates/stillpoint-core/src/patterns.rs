//! Pattern analysis over practice history.
//!
//! Reduces a history log into a [`PatternProfile`]: when the user usually
//! practices, how long, what they come back to, what lifts their mood and
//! how often they show up. Profiles are recomputed on every call.

use chrono::{DateTime, FixedOffset, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;
use crate::time_bucket::TimeBucket;

/// Default number of favorites kept in a profile.
pub const DEFAULT_FAVORITES_LIMIT: usize = 5;

/// An activity and how often it was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteActivity {
    pub activity_id: String,
    pub count: usize,
}

/// Mean mood change reported after an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCorrelation {
    pub average_improvement: f64,
    pub sample_count: usize,
}

/// Summary of a user's practice behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternProfile {
    /// Most common time bucket, `None` without history
    pub favorite_time_bucket: Option<TimeBucket>,
    pub average_duration_minutes: u32,
    /// Ordered by count descending, then by first appearance
    pub favorite_activities: Vec<FavoriteActivity>,
    /// Keyed by activity id in order of first mood-bearing entry
    pub mood_correlations: IndexMap<String, MoodCorrelation>,
    /// Sessions per week, one decimal
    pub weekly_frequency: f64,
    pub total_entries: usize,
}

impl Default for PatternProfile {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternProfile {
    /// Profile of a user with no usable history.
    pub fn empty() -> Self {
        Self {
            favorite_time_bucket: None,
            average_duration_minutes: 0,
            favorite_activities: Vec::new(),
            mood_correlations: IndexMap::new(),
            weekly_frequency: 0.0,
            total_entries: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }

    pub fn top_favorite(&self) -> Option<&FavoriteActivity> {
        self.favorite_activities.first()
    }

    /// Activity with the highest average mood improvement among those
    /// accepted by `eligible`. Equal averages keep the earlier entry.
    pub fn best_mood_activity<F>(&self, mut eligible: F) -> Option<(&str, &MoodCorrelation)>
    where
        F: FnMut(&str) -> bool,
    {
        let mut best: Option<(&str, &MoodCorrelation)> = None;
        for (id, correlation) in &self.mood_correlations {
            if correlation.sample_count == 0 || !eligible(id) {
                continue;
            }
            match best {
                Some((_, current)) if correlation.average_improvement <= current.average_improvement => {}
                _ => best = Some((id.as_str(), correlation)),
            }
        }
        best
    }

    /// Plain-text block for terminal output.
    pub fn render_summary(&self) -> String {
        if self.is_empty() {
            return "No practice history yet.\n".to_string();
        }

        let mut output = String::from("Practice Patterns\n");
        output.push_str(&"─".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Sessions:          {}\n", self.total_entries));
        output.push_str(&format!(
            "  Favorite time:     {}\n",
            self.favorite_time_bucket
                .map(|b| b.label())
                .unwrap_or("-")
        ));
        output.push_str(&format!(
            "  Average duration:  {} min\n",
            self.average_duration_minutes
        ));
        output.push_str(&format!(
            "  Weekly frequency:  {:.1}\n",
            self.weekly_frequency
        ));

        if !self.favorite_activities.is_empty() {
            output.push_str("\nFavorites:\n");
            for (rank, fav) in self.favorite_activities.iter().enumerate() {
                output.push_str(&format!("  {}. {} ({}x)\n", rank + 1, fav.activity_id, fav.count));
            }
        }

        if !self.mood_correlations.is_empty() {
            output.push_str("\nMood lift:\n");
            for (id, corr) in &self.mood_correlations {
                output.push_str(&format!(
                    "  {:<20} {:+.1} ({} samples)\n",
                    id, corr.average_improvement, corr.sample_count
                ));
            }
        }

        output
    }
}

/// Analyzer for building pattern profiles from history.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    /// How many favorites to keep
    pub favorites_limit: usize,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self {
            favorites_limit: DEFAULT_FAVORITES_LIMIT,
        }
    }

    pub fn with_favorites_limit(favorites_limit: usize) -> Self {
        Self { favorites_limit }
    }

    /// Compute a profile. Entries without a completion time or activity id
    /// are left out of every statistic. `history` is never reordered.
    pub fn analyze(&self, history: &[HistoryEntry]) -> PatternProfile {
        let entries = chronological(history);

        let skipped = history.len() - entries.len();
        if skipped > 0 {
            tracing::debug!(skipped, "ignoring malformed history entries");
        }

        if entries.is_empty() {
            return PatternProfile::empty();
        }

        let total_entries = entries.len();

        // Time-of-day histogram
        let mut bucket_counts = [0usize; 5];
        for (_, at) in &entries {
            bucket_counts[TimeBucket::from_hour(at.hour()).index()] += 1;
        }
        let mut favorite_time_bucket = TimeBucket::ALL[0];
        for bucket in TimeBucket::ALL {
            if bucket_counts[bucket.index()] > bucket_counts[favorite_time_bucket.index()] {
                favorite_time_bucket = bucket;
            }
        }

        let durations: Vec<f64> = entries
            .iter()
            .filter_map(|(entry, _)| entry.usable_duration())
            .collect();
        let average_duration_minutes = if durations.is_empty() {
            0
        } else {
            (durations.iter().sum::<f64>() / durations.len() as f64).round() as u32
        };

        // Insertion order of the map is the first-seen order
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for (entry, _) in &entries {
            *counts.entry(entry.activity_id.as_str()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(usize, &str, usize)> = counts
            .iter()
            .enumerate()
            .map(|(first_seen, (id, count))| (first_seen, *id, *count))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        let favorite_activities = ranked
            .into_iter()
            .take(self.favorites_limit)
            .map(|(_, id, count)| FavoriteActivity {
                activity_id: id.to_string(),
                count,
            })
            .collect();

        let mut mood_sums: IndexMap<&str, (f64, usize)> = IndexMap::new();
        for (entry, _) in &entries {
            let Some(improvement) = entry.mood_improvement.filter(|v| v.is_finite()) else {
                continue;
            };
            let slot = mood_sums.entry(entry.activity_id.as_str()).or_insert((0.0, 0));
            slot.0 += improvement;
            slot.1 += 1;
        }
        let mood_correlations = mood_sums
            .into_iter()
            .map(|(id, (sum, count))| {
                (
                    id.to_string(),
                    MoodCorrelation {
                        average_improvement: sum / count as f64,
                        sample_count: count,
                    },
                )
            })
            .collect();

        let weekly_frequency = weekly_frequency(&entries);

        tracing::debug!(
            total_entries,
            favorite_time_bucket = %favorite_time_bucket,
            weekly_frequency,
            "pattern profile computed"
        );

        PatternProfile {
            favorite_time_bucket: Some(favorite_time_bucket),
            average_duration_minutes,
            favorite_activities,
            mood_correlations,
            weekly_frequency,
            total_entries,
        }
    }
}

/// Analyze with the default analyzer.
pub fn analyze_patterns(history: &[HistoryEntry]) -> PatternProfile {
    PatternAnalyzer::new().analyze(history)
}

/// Latest valid entry by completion time. Equal instants resolve to the
/// later position in `history`.
pub fn most_recent_entry(history: &[HistoryEntry]) -> Option<&HistoryEntry> {
    history
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_valid())
        .filter_map(|(pos, entry)| entry.completed_at.map(|at| (at, pos, entry)))
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, _, entry)| entry)
}

/// Valid entries sorted oldest first, input position breaking equal instants.
fn chronological(history: &[HistoryEntry]) -> Vec<(&HistoryEntry, DateTime<FixedOffset>)> {
    let mut entries: Vec<(usize, &HistoryEntry, DateTime<FixedOffset>)> = history
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_valid())
        .filter_map(|(pos, entry)| entry.completed_at.map(|at| (pos, entry, at)))
        .collect();
    entries.sort_by(|a, b| a.2.cmp(&b.2).then(a.0.cmp(&b.0)));
    entries.into_iter().map(|(_, entry, at)| (entry, at)).collect()
}

/// Sessions per week over the span from first to last entry.
///
/// The span counts whole elapsed days, so history covering less than
/// 24 hours (e.g. 23:00 to 01:00 the next day) reports 0.
fn weekly_frequency(entries: &[(&HistoryEntry, DateTime<FixedOffset>)]) -> f64 {
    let (Some((_, first)), Some((_, last))) = (entries.first(), entries.last()) else {
        return 0.0;
    };
    let day_span = (*last - *first).num_days();
    if day_span <= 0 {
        return 0.0;
    }
    let per_week = entries.len() as f64 / day_span as f64 * 7.0;
    (per_week * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    #[test]
    fn test_empty_history_profile() {
        let profile = analyze_patterns(&[]);
        assert_eq!(profile, PatternProfile::empty());
        assert_eq!(profile.total_entries, 0);
        assert_eq!(profile.favorite_time_bucket, None);
        assert_eq!(profile.weekly_frequency, 0.0);
    }

    #[test]
    fn test_malformed_entries_excluded() {
        let mut missing_time = HistoryEntry::new("a", at(1, 7), 10);
        missing_time.completed_at = None;
        let history = vec![missing_time, HistoryEntry::new("b", at(1, 20), 30)];

        let profile = analyze_patterns(&history);
        assert_eq!(profile.total_entries, 1);
        assert_eq!(profile.average_duration_minutes, 30);
        assert_eq!(profile.favorite_activities.len(), 1);
        assert_eq!(profile.favorite_activities[0].activity_id, "b");
    }

    #[test]
    fn test_favorite_bucket_tie_prefers_enumeration_order() {
        // one evening, one morning: tie goes to morning
        let history = vec![
            HistoryEntry::new("a", at(1, 19), 10),
            HistoryEntry::new("b", at(2, 8), 10),
        ];
        let profile = analyze_patterns(&history);
        assert_eq!(profile.favorite_time_bucket, Some(TimeBucket::Morning));
    }

    #[test]
    fn test_favorite_bucket_majority() {
        let history = vec![
            HistoryEntry::new("a", at(1, 23), 10),
            HistoryEntry::new("a", at(2, 2), 10),
            HistoryEntry::new("b", at(3, 8), 10),
        ];
        let profile = analyze_patterns(&history);
        assert_eq!(profile.favorite_time_bucket, Some(TimeBucket::Night));
    }

    #[test]
    fn test_average_duration_rounds() {
        let history = vec![
            HistoryEntry::new("a", at(1, 7), 10),
            HistoryEntry::new("a", at(1, 8), 11),
        ];
        assert_eq!(analyze_patterns(&history).average_duration_minutes, 11);

        let history = vec![
            HistoryEntry::new("a", at(1, 7), 10),
            HistoryEntry::new("a", at(1, 8), 10),
            HistoryEntry::new("a", at(1, 9), 11),
        ];
        assert_eq!(analyze_patterns(&history).average_duration_minutes, 10);
    }

    #[test]
    fn test_unusable_durations_skip_the_average_only() {
        let json = r#"[
            {"activityId": "box-breathing", "completedAt": "2026-03-02T07:00:00Z",
             "durationMinutes": 2.5, "moodImprovement": 1.0},
            {"activityId": "box-breathing", "completedAt": "2026-03-03T07:00:00Z",
             "durationMinutes": 2.5},
            {"activityId": "box-breathing", "completedAt": "2026-03-04T07:00:00Z",
             "durationMinutes": null}
        ]"#;
        let history = crate::history::parse_history_json(json).unwrap().entries;

        let profile = analyze_patterns(&history);
        assert_eq!(profile.total_entries, 3);
        assert_eq!(profile.average_duration_minutes, 3);
        assert_eq!(profile.favorite_activities[0].count, 3);
        assert_eq!(profile.mood_correlations["box-breathing"].sample_count, 1);

        let mut negative = HistoryEntry::new("a", at(1, 7), 10);
        negative.duration_minutes = Some(-30.0);
        let history = vec![negative, HistoryEntry::new("a", at(1, 8), 20)];
        assert_eq!(analyze_patterns(&history).average_duration_minutes, 20);
    }

    #[test]
    fn test_weekly_frequency_counts_whole_days() {
        let history = vec![
            HistoryEntry::new("a", at(1, 23), 10),
            HistoryEntry::new("a", at(2, 1), 10),
        ];
        assert_eq!(analyze_patterns(&history).weekly_frequency, 0.0);
    }

    #[test]
    fn test_favorites_tie_break_by_first_occurrence() {
        // input order is shuffled; "b" happened first in time
        let history = vec![
            HistoryEntry::new("a", at(2, 6), 10),
            HistoryEntry::new("b", at(1, 6), 10),
            HistoryEntry::new("a", at(3, 6), 10),
            HistoryEntry::new("b", at(4, 6), 10),
            HistoryEntry::new("a", at(5, 6), 10),
            HistoryEntry::new("b", at(6, 6), 10),
        ];
        let profile = analyze_patterns(&history);
        assert_eq!(profile.favorite_activities[0].activity_id, "b");
        assert_eq!(profile.favorite_activities[0].count, 3);
        assert_eq!(profile.favorite_activities[1].activity_id, "a");
    }

    #[test]
    fn test_favorites_truncated_to_limit() {
        let history: Vec<_> = (0..8)
            .map(|i| HistoryEntry::new(format!("act-{i}"), at(1, 6) + Duration::minutes(i), 10))
            .collect();
        let profile = analyze_patterns(&history);
        assert_eq!(profile.favorite_activities.len(), 5);
        assert_eq!(profile.favorite_activities[4].activity_id, "act-4");

        let profile = PatternAnalyzer::with_favorites_limit(2).analyze(&history);
        assert_eq!(profile.favorite_activities.len(), 2);
    }

    #[test]
    fn test_mood_correlations_average_and_omit() {
        let history = vec![
            HistoryEntry::new("calm", at(1, 7), 5).with_mood_improvement(1.0),
            HistoryEntry::new("calm", at(2, 7), 5).with_mood_improvement(2.0),
            HistoryEntry::new("flow", at(3, 7), 20),
            HistoryEntry::new("lift", at(4, 7), 20).with_mood_improvement(0.5),
        ];
        let profile = analyze_patterns(&history);
        assert_eq!(profile.mood_correlations.len(), 2);
        assert!(!profile.mood_correlations.contains_key("flow"));

        let calm = &profile.mood_correlations["calm"];
        assert_eq!(calm.sample_count, 2);
        assert!((calm.average_improvement - 1.5).abs() < 1e-9);

        let (best, _) = profile.best_mood_activity(|_| true).unwrap();
        assert_eq!(best, "calm");
        let (best, _) = profile.best_mood_activity(|id| id != "calm").unwrap();
        assert_eq!(best, "lift");
    }

    #[test]
    fn test_best_mood_tie_keeps_first() {
        let history = vec![
            HistoryEntry::new("x", at(1, 7), 5).with_mood_improvement(1.0),
            HistoryEntry::new("y", at(2, 7), 5).with_mood_improvement(1.0),
        ];
        let profile = analyze_patterns(&history);
        assert_eq!(profile.best_mood_activity(|_| true).unwrap().0, "x");
    }

    #[test]
    fn test_weekly_frequency() {
        // 4 entries over 14 days -> 2.0 per week
        let history = vec![
            HistoryEntry::new("a", at(1, 7), 10),
            HistoryEntry::new("a", at(5, 7), 10),
            HistoryEntry::new("a", at(10, 7), 10),
            HistoryEntry::new("a", at(15, 7), 10),
        ];
        assert_eq!(analyze_patterns(&history).weekly_frequency, 2.0);

        // 2 entries over 3 days -> 4.7
        let history = vec![
            HistoryEntry::new("a", at(1, 7), 10),
            HistoryEntry::new("a", at(4, 7), 10),
        ];
        assert_eq!(analyze_patterns(&history).weekly_frequency, 4.7);
    }

    #[test]
    fn test_weekly_frequency_zero_for_same_day() {
        let history = vec![
            HistoryEntry::new("a", at(1, 7), 10),
            HistoryEntry::new("a", at(1, 20), 10),
        ];
        assert_eq!(analyze_patterns(&history).weekly_frequency, 0.0);
        assert_eq!(
            analyze_patterns(&history[..1]).weekly_frequency,
            0.0
        );
    }

    #[test]
    fn test_hour_uses_entry_offset() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        // 22:00 UTC is 07:00 the next day at +09:00
        let local = Utc
            .with_ymd_and_hms(2026, 3, 1, 22, 0, 0)
            .unwrap()
            .with_timezone(&offset);
        let profile = analyze_patterns(&[HistoryEntry::new("a", local, 10)]);
        assert_eq!(profile.favorite_time_bucket, Some(TimeBucket::Morning));
    }

    #[test]
    fn test_input_not_mutated() {
        let history = vec![
            HistoryEntry::new("late", at(9, 7), 10),
            HistoryEntry::new("early", at(1, 7), 10),
        ];
        let before = history.clone();
        let _ = analyze_patterns(&history);
        assert_eq!(history, before);
    }

    #[test]
    fn test_most_recent_entry() {
        let history = vec![
            HistoryEntry::new("newest", at(9, 7), 10),
            HistoryEntry::new("older", at(1, 7), 10),
        ];
        assert_eq!(most_recent_entry(&history).unwrap().activity_id, "newest");

        let tied = vec![
            HistoryEntry::new("first", at(3, 7), 10),
            HistoryEntry::new("second", at(3, 7), 10),
        ];
        assert_eq!(most_recent_entry(&tied).unwrap().activity_id, "second");
        assert!(most_recent_entry(&[]).is_none());
    }

    #[test]
    fn test_render_summary() {
        assert!(PatternProfile::empty()
            .render_summary()
            .contains("No practice history"));

        let history = vec![
            HistoryEntry::new("calm", at(1, 7), 5).with_mood_improvement(1.0),
        ];
        let summary = analyze_patterns(&history).render_summary();
        assert!(summary.contains("morning"));
        assert!(summary.contains("1. calm (1x)"));
        assert!(summary.contains("+1.0"));
    }
}

//! # Stillpoint Core Library
//!
//! Adaptive practice recommendations for yoga sessions and breathing
//! exercises. Everything the CLI does is available here; the binary is a
//! thin layer over the same engine.
//!
//! ## Architecture
//!
//! - **Patterns**: reduces a history log into a [`PatternProfile`]
//! - **Time buckets**: maps hours to parts of the day and checks catalog tags
//! - **Recommendations**: an ordered policy for the primary pick plus a
//!   ranked, de-duplicated list builder
//! - **Catalog**: read-only activity metadata behind [`CatalogAccessor`]
//!
//! The engine is a pure function of `(now, history, catalog)`. It keeps no
//! state between calls and never mutates its inputs.
//!
//! ## Key Components
//!
//! - [`RecommendationEngine`]: primary recommendation and ranked lists
//! - [`PatternAnalyzer`]: history summarization
//! - [`Catalog`]: built-in or TOML-backed activity catalog
//! - [`Config`]: engine tunables and application settings

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod patterns;
pub mod recommend;
pub mod time_bucket;

pub use catalog::{ActivityKind, ActivityMetadata, Catalog, CatalogAccessor, CatalogFile};
pub use config::{CatalogConfig, Config, EngineConfig, LoggingConfig};
pub use error::{CatalogError, ConfigError, CoreError, HistoryError, ValidationError};
pub use history::{load_history, parse_history_json, HistoryEntry, HistoryLoad};
pub use patterns::{
    analyze_patterns, most_recent_entry, FavoriteActivity, MoodCorrelation, PatternAnalyzer,
    PatternProfile,
};
pub use recommend::{Recommendation, RecommendationCategory, RecommendationEngine};
pub use time_bucket::{get_time_bucket, is_appropriate_for_time, TimeBucket, TimeTag};

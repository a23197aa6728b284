//! Recommendation and pattern commands.

use std::path::PathBuf;

use clap::Args;
use chrono::Timelike;

use stillpoint_core::{
    Catalog, CatalogAccessor, Config, PatternAnalyzer, Recommendation, RecommendationEngine,
    TimeBucket,
};

use super::{parse_now, read_history, resolve_catalog, CommandResult};

#[derive(Args)]
pub struct RecommendArgs {
    /// History JSON file
    #[arg(long)]
    history: PathBuf,
    /// Evaluate at this time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<String>,
    /// Catalog TOML file, overrides config
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct TopArgs {
    /// History JSON file
    #[arg(long)]
    history: PathBuf,
    /// Number of suggestions (defaults to engine.default_limit)
    #[arg(long)]
    limit: Option<usize>,
    /// Evaluate at this time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<String>,
    /// Catalog TOML file, overrides config
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct PatternsArgs {
    /// History JSON file
    #[arg(long)]
    history: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run_recommend(args: RecommendArgs, config: &Config) -> CommandResult {
    let catalog = resolve_catalog(args.catalog.as_deref(), config)?;
    let history = read_history(&args.history)?;
    let now = parse_now(args.at.as_deref())?;

    let engine = RecommendationEngine::with_config(&catalog, config.engine.clone());
    let Some(rec) = engine.recommend(now, &history) else {
        return Err("no activity in the catalog matches the current time".into());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
    } else {
        println!(
            "It's {} ({}).",
            now.format("%H:%M"),
            TimeBucket::from_hour(now.hour())
        );
        print_recommendation(&catalog, 1, &rec);
    }
    Ok(())
}

pub fn run_top(args: TopArgs, config: &Config) -> CommandResult {
    let catalog = resolve_catalog(args.catalog.as_deref(), config)?;
    let history = read_history(&args.history)?;
    let now = parse_now(args.at.as_deref())?;
    let limit = args.limit.unwrap_or(config.engine.default_limit);

    let engine = RecommendationEngine::with_config(&catalog, config.engine.clone());
    let recs = engine.top_recommendations(now, &history, limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recs)?);
        return Ok(());
    }

    if recs.is_empty() {
        println!("No activities available.");
        return Ok(());
    }
    for (rank, rec) in recs.iter().enumerate() {
        print_recommendation(&catalog, rank + 1, rec);
    }
    Ok(())
}

pub fn run_patterns(args: PatternsArgs, config: &Config) -> CommandResult {
    let history = read_history(&args.history)?;
    let profile = PatternAnalyzer::with_favorites_limit(config.engine.favorites_limit)
        .analyze(&history);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", profile.render_summary());
    }
    Ok(())
}

fn print_recommendation(catalog: &Catalog, rank: usize, rec: &Recommendation) {
    let (name, minutes) = catalog
        .lookup(&rec.activity_id)
        .map(|a| (a.name.as_str(), a.duration_minutes))
        .unwrap_or((rec.activity_id.as_str(), 0));
    let marker = if rec.is_primary { "★" } else { " " };
    println!(
        "{marker} {rank}. {name} ({minutes} min) [{}] {:.0}%",
        rec.category,
        rec.confidence * 100.0
    );
    println!("     {}", rec.reason);
}

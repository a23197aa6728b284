use std::path::PathBuf;

use clap::Subcommand;
use stillpoint_core::{Catalog, CatalogAccessor, Config, TimeBucket};

use super::{resolve_catalog, CommandResult};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List activities in declaration order
    List {
        /// Catalog TOML file, overrides config
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output as TOML catalog file
        #[arg(long)]
        toml: bool,
    },
    /// Validate a catalog file
    Check {
        /// Catalog TOML file
        path: PathBuf,
    },
}

pub fn run(action: CatalogAction, config: &Config) -> CommandResult {
    match action {
        CatalogAction::List { catalog, toml } => {
            let catalog = resolve_catalog(catalog.as_deref(), config)?;
            if toml {
                print!("{}", catalog.to_toml_string()?);
            } else {
                print_catalog(&catalog);
            }
        }
        CatalogAction::Check { path } => {
            let catalog = Catalog::load(&path)?;
            let missing: Vec<_> = TimeBucket::ALL
                .into_iter()
                .filter(|b| {
                    catalog
                        .default_activity_for(*b)
                        .map_or(true, |id| !catalog.contains(id))
                })
                .collect();

            println!("{}: {} activities", path.display(), catalog.len());
            for bucket in &missing {
                println!("  warning: no usable default for {bucket}");
            }
            if missing.is_empty() {
                println!("ok");
            }
        }
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    for activity in catalog.list_all() {
        let tags: Vec<_> = activity.time_tags.iter().map(|t| t.label()).collect();
        println!(
            "{:<20} {:<24} {:<9} {:>3} min  {}",
            activity.id,
            activity.name,
            activity.kind.label(),
            activity.duration_minutes,
            tags.join(",")
        );
    }
    println!();
    for bucket in TimeBucket::ALL {
        println!(
            "default {:<10} {}",
            bucket.label(),
            catalog.default_activity_for(bucket).unwrap_or("-")
        );
    }
}

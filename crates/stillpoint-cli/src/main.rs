use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use stillpoint_core::{logging, Config};

mod commands;

#[derive(Parser)]
#[command(name = "stillpoint-cli", version, about = "Stillpoint practice recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single best activity for right now
    Recommend(commands::recommend::RecommendArgs),
    /// Ranked list of suggested activities
    Top(commands::recommend::TopArgs),
    /// Summarize practice patterns from history
    Patterns(commands::recommend::PatternsArgs),
    /// Activity catalog
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    logging::init(&config.logging);

    let result = match cli.command {
        Commands::Recommend(args) => commands::recommend::run_recommend(args, &config),
        Commands::Top(args) => commands::recommend::run_top(args, &config),
        Commands::Patterns(args) => commands::recommend::run_patterns(args, &config),
        Commands::Catalog { action } => commands::catalog::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "stillpoint-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

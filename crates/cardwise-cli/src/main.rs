use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cardwise", version, about = "Cardwise flashcard trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Card authoring and inspection
    Card {
        #[command(subcommand)]
        action: commands::card::CardAction,
    },
    /// List the cards due for review
    Due(commands::due::DueArgs),
    /// Run an interactive review session
    Review(commands::review::ReviewArgs),
    /// Deck statistics
    Stats(commands::stats::StatsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    // stderr only: stdout carries prompts and JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CARDWISE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Card { action } => commands::card::run(action),
        Commands::Due(args) => commands::due::run(args),
        Commands::Review(args) => commands::review::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cardwise", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

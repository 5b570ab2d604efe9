use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "codefun-cli", version, about = "CodeFun Quiz CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz in the terminal
    Play(commands::play::PlayArgs),
    /// List available levels
    Levels(commands::levels::LevelsArgs),
    /// Result history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Best score per level
    Best(commands::best::BestArgs),
    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

/// Log to stderr so it never interleaves with the quiz screen.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Levels(args) => commands::levels::run(args),
        Commands::History { action } => commands::history::run(action),
        Commands::Best(args) => commands::best::run(args),
        Commands::Theme { action } => commands::theme::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "codefun-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

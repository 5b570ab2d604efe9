use clap::Subcommand;
use codefun_core::{ResultRecorder, SqliteStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List past results, most recent first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all past results (best scores are kept)
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = ResultRecorder::new(SqliteStore::open()?);

    match action {
        HistoryAction::List { json } => {
            let history = recorder.history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No history yet.");
            } else {
                for entry in &history {
                    println!(
                        "{}  level {:<8} {}/{} ({}%)",
                        entry.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        entry.level,
                        entry.score,
                        entry.total,
                        entry.percent
                    );
                }
            }
        }
        HistoryAction::Clear => {
            recorder.clear_history()?;
            println!("history cleared");
        }
    }
    Ok(())
}

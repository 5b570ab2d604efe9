use std::path::PathBuf;

use clap::Args;
use codefun_core::Config;
use serde::Serialize;

use super::load_bank;

#[derive(Args)]
pub struct LevelsArgs {
    /// Question document (defaults to the configured path)
    #[arg(long)]
    pub questions: Option<PathBuf>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct LevelRow {
    level: String,
    question_count: usize,
    seconds_per_question: Option<u32>,
}

pub fn run(args: LevelsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bank = load_bank(&config, args.questions.as_deref())?;

    let rows: Vec<LevelRow> = bank
        .levels()
        .into_iter()
        .map(|summary| LevelRow {
            seconds_per_question: config.levels.seconds_for(&summary.level),
            level: summary.level,
            question_count: summary.question_count,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        let timer = match row.seconds_per_question {
            Some(secs) => format!("{secs}s per question"),
            None => "no timer".to_string(),
        };
        println!("{:<10} {:>3} questions  {timer}", row.level, row.question_count);
    }
    Ok(())
}

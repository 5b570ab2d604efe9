use clap::Args;
use codefun_core::storage::BestScores;
use codefun_core::SqliteStore;

#[derive(Args)]
pub struct BestArgs {
    /// Only this level
    #[arg(long)]
    pub level: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let best = BestScores::new(&store);

    match args.level {
        Some(level) => {
            let score = best.get(&level)?;
            if args.json {
                println!("{}", serde_json::json!({ "level": level, "best": score }));
            } else {
                println!("{score}");
            }
        }
        None => {
            let table = best.all()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else if table.is_empty() {
                println!("No scores yet.");
            } else {
                for (level, score) in &table {
                    println!("{level:<10} {score}");
                }
            }
        }
    }
    Ok(())
}

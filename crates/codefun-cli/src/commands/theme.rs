use clap::Subcommand;
use codefun_core::storage::ThemePreference;
use codefun_core::{SqliteStore, Theme};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Set the theme
    Set {
        /// "light" or "dark"
        theme: Theme,
    },
    /// Switch between light and dark
    Toggle,
}

pub fn run(action: ThemeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let preference = ThemePreference::new(&store);

    let theme = match action {
        ThemeAction::Get => preference.get()?,
        ThemeAction::Set { theme } => {
            preference.set(theme)?;
            theme
        }
        ThemeAction::Toggle => preference.toggle()?,
    };
    println!("{}", theme.as_str());
    Ok(())
}

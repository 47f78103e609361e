use clap::Subcommand;
use focuscycle_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "focus_minutes", "long_break_interval")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value in minutes (or sessions, for the interval)
        value: String,
    },
    /// List all config values
    List,
    /// Reset one key, or everything, to the documented defaults
    Reset {
        /// Config key; omit to reset every key
        key: Option<String>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset { key } => {
            let mut config = Config::load()?;
            match key {
                Some(key) => {
                    config.reset(&key)?;
                    config.save()?;
                    println!("ok");
                }
                None => {
                    config.reset_all();
                    config.save()?;
                    println!("config reset to defaults");
                }
            }
        }
    }
    Ok(())
}

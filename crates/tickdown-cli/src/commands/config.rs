use clap::Subcommand;
use tickdown_core::error::Result;
use tickdown_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.tick_lead_seconds")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Show or change how many seconds before zero the tick starts
    Lead {
        /// New lead in seconds; omit to print the current one
        seconds: Option<u32>,
    },
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
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
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Lead { seconds: None } => {
            let config = Config::load()?;
            println!("{}", config.timer.tick_lead_seconds);
        }
        ConfigAction::Lead {
            seconds: Some(seconds),
        } => {
            let mut config = Config::load()?;
            config.timer.tick_lead_seconds = seconds;
            config.save()?;
            println!("tick lead set to {seconds}s (applies to the next countdown)");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}

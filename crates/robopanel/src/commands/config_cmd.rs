//! Config command handlers.

use robopanel_config::{Config, Profile, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            database_url,
            admin_id,
        } => {
            let mut cfg = load_config_or_default();
            cfg.default_profile.get_or_insert_with(|| "default".into());
            cfg.profiles.insert(
                "default".into(),
                Profile {
                    database_url,
                    admin_id: Some(admin_id),
                    ..Profile::default()
                },
            );
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Wrote {}", config_path().display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg: Config = load_config_or_default();
            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Store {
                message: format!("config serialization failed: {e}"),
            })?;
            print!("{rendered}");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }
    }
}

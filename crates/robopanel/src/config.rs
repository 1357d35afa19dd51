//! Profile resolution: config file + env + CLI flags → a ready panel.
//!
//! The precedence is CLI flag > environment > profile > default, with the
//! config file loaded through `robopanel-config`.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use robopanel_api::{NetworkMonitor, ProbeMonitor, RtdbClient, StoreConfig};
use robopanel_config::{self as config_file, Profile};
use robopanel_core::{AdminAllowList, StoreGateway, SyncConfig, Synchronizer};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command handler needs to talk to the device.
pub struct Panel {
    pub sync: Synchronizer<RtdbClient>,
    /// Admin id for emergency actions, if one is configured.
    pub admin_id: Option<String>,
}

impl Panel {
    /// The configured admin id, or a usage error telling the operator how
    /// to provide one.
    pub fn require_admin(&self) -> Result<&str, CliError> {
        self.admin_id.as_deref().ok_or(CliError::NoAdminId)
    }
}

/// Build a [`Panel`] from the config file, profile, and CLI overrides.
pub fn build_panel(global: &GlobalOpts) -> Result<Panel, CliError> {
    let cfg = config_file::load_config_or_default();
    let profile_name = global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let profile = cfg.profiles.get(&profile_name);

    // An explicitly requested profile must exist.
    if global.profile.is_some() && profile.is_none() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available.join(", "),
        });
    }

    let store_config = resolve_store_config(global, profile, &profile_name)?;
    let client = RtdbClient::new(store_config).map_err(|e| CliError::Store {
        message: e.to_string(),
    })?;

    let monitor: Arc<dyn NetworkMonitor> = match profile {
        Some(p) => Arc::new(config_file::profile_to_probe(p, &profile_name)?),
        None => Arc::new(ProbeMonitor::default()),
    };
    let sync_config =
        profile.map_or_else(SyncConfig::default, config_file::profile_to_sync_config);

    let sync = Synchronizer::new(
        StoreGateway::new(Arc::new(client)),
        monitor,
        Arc::new(AdminAllowList::default()),
        sync_config,
    );

    let admin_id = global
        .admin
        .clone()
        .or_else(|| profile.and_then(|p| p.admin_id.clone()));

    Ok(Panel { sync, admin_id })
}

fn resolve_store_config(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Result<StoreConfig, CliError> {
    let mut config = if let Some(ref url_str) = global.database_url {
        let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
            field: "database-url".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
        StoreConfig::new(url)
    } else if let Some(profile) = profile {
        config_file::profile_to_store_config(profile, profile_name)?
    } else {
        return Err(CliError::NoConfig {
            path: config_file::config_path().display().to_string(),
        });
    };

    config = config.with_timeout(Duration::from_secs(global.timeout));
    if let Some(ref token) = global.auth_token {
        config = config.with_auth_token(SecretString::from(token.clone()));
    }
    Ok(config)
}

/// `load_config` module: Loads the optional YAML settings file and reads secrets from the environment.
///
/// Settings that are safe to commit (output directory, locale order, page size, API base
/// URLs) live in YAML; every key is optional. Space ids and tokens only ever come from the
/// environment, which `main` fills from `.env` when present.
///
/// # Errors
/// All errors in this module use `anyhow::Error` and name the file or variable at fault.
use anyhow::{Context, Result};
use contentful_audit_core::config::{AuditConfig, Credentials, SpaceRef, MAX_PAGE_SIZE};
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const SPACE_ID: &str = "CONTENTFUL_SPACE_ID";
pub const ENVIRONMENT_ID: &str = "CONTENTFUL_ENVIRONMENT_ID";
pub const DELIVERY_TOKEN: &str = "CONTENTFUL_DELIVERY_TOKEN";
pub const MANAGEMENT_TOKEN: &str = "CONTENTFUL_MANAGEMENT_TOKEN";
pub const SECOND_SPACE_ID: &str = "CONTENTFUL_SPACE_ID_2";
pub const SECOND_ENVIRONMENT_ID: &str = "CONTENTFUL_ENVIRONMENT_ID_2";

/// Load settings from `path`, or defaults when no path is given.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<AuditConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        let config = AuditConfig::default();
        config.trace_loaded();
        return Ok(config);
    };
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file parses as YAML null; treat it as "all defaults".
    let config: AuditConfig = if config_content.trim().is_empty() {
        AuditConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    if config.locales.is_empty() {
        anyhow::bail!("Config key `locales` must list at least one locale");
    }
    if !(1..=MAX_PAGE_SIZE).contains(&config.page_size) {
        anyhow::bail!(
            "Config key `page_size` must be between 1 and {MAX_PAGE_SIZE}, got {}",
            config.page_size
        );
    }
    config.trace_loaded();
    Ok(config)
}

fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(var = key, "Environment variable is empty");
            anyhow::bail!("{key} environment variable is empty")
        }
        Err(e) => {
            error!(error = ?e, var = key, "Environment variable not set");
            Err(e).with_context(|| format!("{key} environment variable not set"))
        }
    }
}

/// The primary space, from `CONTENTFUL_SPACE_ID` and `CONTENTFUL_ENVIRONMENT_ID`.
pub fn primary_space() -> Result<SpaceRef> {
    Ok(SpaceRef::new(
        required_env(SPACE_ID)?,
        required_env(ENVIRONMENT_ID)?,
    ))
}

/// The space compared against, from `CONTENTFUL_SPACE_ID_2` and `CONTENTFUL_ENVIRONMENT_ID_2`.
pub fn second_space() -> Result<SpaceRef> {
    Ok(SpaceRef::new(
        required_env(SECOND_SPACE_ID)?,
        required_env(SECOND_ENVIRONMENT_ID)?,
    ))
}

pub fn delivery_credentials() -> Result<Credentials> {
    let space = primary_space()?;
    let token = required_env(DELIVERY_TOKEN)?;
    info!(space = %space, "Delivery credentials found in env");
    Ok(Credentials::new(space, token))
}

pub fn management_credentials(space: SpaceRef) -> Result<Credentials> {
    let token = required_env(MANAGEMENT_TOKEN)?;
    info!(space = %space, "Management credentials found in env");
    Ok(Credentials::new(space, token))
}

//! Environment variable handling for the pushrelay service.
//!
//! Configuration paths map to `PUSHRELAY__SECTION__KEY` variables. The service
//! it replaces was configured through a handful of flat variables
//! (`REDIS_ADDR`, `REDIS_PASSWORD`, `FIREBASE_CREDENTIALS_PATH`); those are
//! still honoured and win over every other source when set.

use std::env;
use tracing::debug;

use crate::models::AppConfig;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "PUSHRELAY";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

pub const LEGACY_REDIS_ADDR: &str = "REDIS_ADDR";
pub const LEGACY_REDIS_PASSWORD: &str = "REDIS_PASSWORD";
pub const LEGACY_FIREBASE_CREDENTIALS_PATH: &str = "FIREBASE_CREDENTIALS_PATH";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// # Arguments
///
/// * `path` - The configuration path (e.g., "redis.addr")
///
/// # Returns
///
/// The environment variable name (e.g., "PUSHRELAY__REDIS__ADDR")
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Applies the legacy flat variables on top of a loaded configuration.
pub fn apply_legacy_env_overrides(config: AppConfig) -> AppConfig {
    apply_legacy_overrides_with(config, |name| env::var(name).ok())
}

/// Same as [`apply_legacy_env_overrides`], reading variables through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_legacy_overrides_with<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(addr) = read(LEGACY_REDIS_ADDR) {
        debug!("redis.addr taken from {}", LEGACY_REDIS_ADDR);
        config.redis.addr = addr;
    }
    if let Some(password) = read(LEGACY_REDIS_PASSWORD) {
        debug!("redis.password taken from {}", LEGACY_REDIS_PASSWORD);
        config.redis.password = Some(password);
    }
    if let Some(path) = read(LEGACY_FIREBASE_CREDENTIALS_PATH) {
        debug!(
            "firebase.key_path taken from {}",
            LEGACY_FIREBASE_CREDENTIALS_PATH
        );
        config.firebase.key_path = Some(path);
    }
    config
}

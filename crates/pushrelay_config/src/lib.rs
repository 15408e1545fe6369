use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;
pub use env_vars::{
    apply_legacy_env_overrides, apply_legacy_overrides_with, config_path_to_env_var,
    LEGACY_FIREBASE_CREDENTIALS_PATH,
};
pub use models::*;

/// Loads the layered application configuration.
///
/// Sources, lowest priority first: `config/default.*`, `config/<RUN_ENV>.*`,
/// `PUSHRELAY__*` environment variables, and finally the legacy flat
/// variables (`REDIS_ADDR`, `REDIS_PASSWORD`, `FIREBASE_CREDENTIALS_PATH`).
/// Missing files are skipped; every field has a default.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = env::var("PUSHRELAY_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    debug!("config: default_path: {}", default_path.display());
    debug!("config: env_path: {}", env_path.display());

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .prefix_separator(env_vars::CONFIG_SEPARATOR)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(apply_legacy_env_overrides(raw_config))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `DOTENV_OVERRIDE` when set, else the first command line
/// argument when it starts with `.env`, else `.env`. A missing file is not an
/// error. Returns the path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = std::env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_empty_sources_yield_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .expect("empty config builds")
            .try_deserialize()
            .expect("defaults deserialize");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackendKind::Redis);
        assert_eq!(config.firebase.api_base_url, "https://fcm.googleapis.com");
        assert!(config.firebase.key_path.is_none());
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let toml = r#"
            [server]
            port = 9090

            [store]
            backend = "memory"

            [firebase]
            key_path = "/secrets/service-account.json"
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .expect("config builds")
            .try_deserialize()
            .expect("config deserializes");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.backend, StoreBackendKind::Memory);
        assert_eq!(
            config.firebase.key_path.as_deref(),
            Some("/secrets/service-account.json")
        );
        assert_eq!(config.redis.op_timeout_ms, 2000);
    }
}

//! Backend connection settings and the application config file.

use std::sync::OnceLock;

use store::AlumniConfig;

use super::BackendError;

/// Where the hosted backend lives and the public key clients present.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    /// Read `HOSTED_URL` and `HOSTED_ANON_KEY` (a `.env` file is honoured).
    pub fn from_env() -> Result<Self, BackendError> {
        dotenvy::dotenv().ok();

        let url = std::env::var("HOSTED_URL").map_err(|_| BackendError::MissingEnv("HOSTED_URL"))?;
        let anon_key = std::env::var("HOSTED_ANON_KEY")
            .map_err(|_| BackendError::MissingEnv("HOSTED_ANON_KEY"))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

static APP_CONFIG: OnceLock<AlumniConfig> = OnceLock::new();

/// The process-wide [`AlumniConfig`], loaded once from `ALUMNI_CONFIG` or
/// `./alumni.toml`. A missing file means defaults; an unreadable one is
/// logged and also falls back to defaults.
pub fn app_config() -> &'static AlumniConfig {
    APP_CONFIG.get_or_init(|| {
        dotenvy::dotenv().ok();
        let path = std::env::var("ALUMNI_CONFIG")
            .unwrap_or_else(|_| AlumniConfig::filename().to_string());

        match std::fs::read_to_string(&path) {
            Ok(text) => match AlumniConfig::from_toml(&text) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {}: {}", path, e);
                    AlumniConfig::default()
                }
            },
            Err(_) => AlumniConfig::default(),
        }
    })
}

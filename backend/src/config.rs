use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {name}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
}

/// Service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
    pub model_path: String,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            format!("{}/../frontend/dist", manifest_dir)
        } else {
            "/usr/src/app/frontend/dist".to_string()
        };

        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            frontend_dir,
            model_path: "../chilli_nutrient_model.pt".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `FRONTEND_DIR`, `MODEL_PATH` and
    /// `MAX_UPLOAD_BYTES`, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            frontend_dir: env::var("FRONTEND_DIR").unwrap_or(defaults.frontend_dir),
            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
        Err(_) => Ok(default),
    }
}

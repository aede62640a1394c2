use std::env;
use std::path::PathBuf;

const LOCAL_API_URL: &str = "http://localhost:5000";
const DEFAULT_STORAGE_PATH: &str = ".quiz-portal/session.json";

/// AppConfig
///
/// Runtime configuration for the client. Loaded once at startup and cloned into
/// whatever needs it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format and how strictly the API URL
    // is required.
    pub env: Env,
    // Base URL of the quiz backend, without a trailing slash.
    pub api_base_url: String,
    // File holding the persisted session (the durable key-value store).
    pub storage_path: PathBuf,
}

/// Env
///
/// Local runs fall back to a backend on localhost; production must be told where the
/// backend lives.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe values for tests: local env, localhost backend, storage under the temp dir.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_URL.to_string(),
            storage_path: env::temp_dir().join("quiz-portal-test").join("session.json"),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in production when `QUIZ_API_URL` is not set, so a misconfigured
    /// deployment never silently talks to localhost.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("QUIZ_API_URL")
                .expect("FATAL: QUIZ_API_URL must be set in production."),
            Env::Local => env::var("QUIZ_API_URL").unwrap_or_else(|_| LOCAL_API_URL.to_string()),
        };

        let storage_path = env::var("QUIZ_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_path,
        }
    }
}

use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medtrail";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Medtrail/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medtrail")
}

/// Get the SQLite database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("medtrail.db")
}

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "info,medtrail=debug"
}

/// Configuration for the external pattern-analysis service.
///
/// A missing API key is a supported state: snapshot generation still runs,
/// the AI step is skipped and snapshots fall back to deterministic metrics
/// gating only.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        AiConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()),
            base_url: lookup("MEDTRAIL_AI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: lookup("MEDTRAIL_AI_MODEL").unwrap_or_else(|| "gpt-4-turbo".to_string()),
            timeout_secs: 120,
        }
    }

    /// Configuration with analysis disabled (no credential).
    pub fn disabled() -> Self {
        AiConfig {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 120,
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        AiConfig::disabled()
    }
}

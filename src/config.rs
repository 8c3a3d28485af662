use anyhow::{anyhow, bail, Context, Result};
use crate::routes::config::{MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Origins the published frontend is served from
pub const DEFAULT_ALLOWED_ORIGINS: &str = "https://radiantic.vercel.app,http://localhost:5173,https://fastapi-production-531a.up.railway.app,*";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub schedule: ScheduleConfig,
    pub arxiv: ArxivConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tool_rounds: usize,
}

// Keeps the credential out of startup logs
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub error_backoff_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArxivConfig {
    pub api_base: String,
    pub max_results: usize,
    pub lookback_days: u32,
}

impl ScheduleConfig {
    /// The startup interval obeys the same whole-minute bounds as
    /// `POST /api/config`, and a failed cycle always waits before retrying.
    fn validate(&self) -> Result<()> {
        let min_secs = MIN_INTERVAL_MINUTES as u64 * 60;
        let max_secs = MAX_INTERVAL_MINUTES as u64 * 60;

        if self.interval_secs % 60 != 0 || !(min_secs..=max_secs).contains(&self.interval_secs) {
            bail!(
                "UPDATE_INTERVAL_SECS must be a whole number of minutes between {} and {} seconds, got {}",
                min_secs,
                max_secs,
                self.interval_secs
            );
        }

        if self.error_backoff_secs == 0 {
            bail!("ERROR_BACKOFF_SECS must be at least 1");
        }

        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// A missing `GROQ_API_KEY` is fatal: the service never runs without a
    /// backend credential.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GROQ_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GROQ_API_KEY environment variable is required"))?;

        let schedule = ScheduleConfig {
            interval_secs: parse_or(&lookup, "UPDATE_INTERVAL_SECS", 300)?,
            error_backoff_secs: parse_or(&lookup, "ERROR_BACKOFF_SECS", 30)?,
        };
        schedule.validate()?;

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&lookup, "PORT", 8000)?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: lookup("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            llm: LLMConfig {
                api_key,
                api_base: lookup("LLM_API_BASE")
                    .unwrap_or_else(|| crate::llm::groq::GROQ_API_BASE.to_string()),
                model: lookup("LLM_MODEL").unwrap_or_else(|| crate::llm::groq::models::DEFAULT.to_string()),
                timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 180)?,
                max_tool_rounds: parse_or(&lookup, "LLM_MAX_TOOL_ROUNDS", 6)?,
            },
            schedule,
            arxiv: ArxivConfig {
                api_base: lookup("ARXIV_API_BASE")
                    .unwrap_or_else(|| crate::search::arxiv::ARXIV_API_BASE.to_string()),
                max_results: parse_or(&lookup, "ARXIV_MAX_RESULTS", 10)?,
                lookback_days: parse_or(&lookup, "ARXIV_LOOKBACK_DAYS", 2)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk-test")])).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.schedule.interval_secs, 300);
        assert_eq!(config.schedule.error_backoff_secs, 30);
        assert_eq!(config.arxiv.lookback_days, 2);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert!(config.server.cors_allowed_origins.contains(&"*".to_string()));
        assert!(config
            .server
            .cors_allowed_origins
            .contains(&"http://localhost:5173".to_string()));
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("PORT", "9001"),
            ("UPDATE_INTERVAL_SECS", "60"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );

        let err = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk-test"), ("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_interval_out_of_bounds_is_rejected() {
        for interval in ["0", "30", "90", "86460", "999999999"] {
            let err = Config::from_lookup(lookup_from(&[
                ("GROQ_API_KEY", "gsk-test"),
                ("UPDATE_INTERVAL_SECS", interval),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("UPDATE_INTERVAL_SECS"), "accepted {}", interval);
        }

        let err = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("ERROR_BACKOFF_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ERROR_BACKOFF_SECS"));

        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk-test"),
            ("UPDATE_INTERVAL_SECS", "86400"),
            ("ERROR_BACKOFF_SECS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.schedule.interval_secs, 86_400);
        assert_eq!(config.schedule.error_backoff_secs, 1);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk-secret")])).unwrap();
        let rendered = format!("{:?}", config.llm);
        assert!(!rendered.contains("gsk-secret"));
    }
}

use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::fit_scoring::FitWeights;
use crate::validation::document::DEFAULT_MIN_VALID_SCORE;

/// Tunable scoring knobs. `Default` carries the documented constants so the
/// scoring core works without any environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub fit_weights: FitWeights,
    /// Share of `ats_score` in `overall_score`; fit gets the rest.
    pub ats_weight: f64,
    pub cultural_signals_default: f64,
    pub min_validation_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fit_weights: FitWeights::default(),
            ats_weight: 0.5,
            cultural_signals_default: 70.0,
            min_validation_score: DEFAULT_MIN_VALID_SCORE,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if any value is present but unusable.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_batch_size: usize,
    pub max_concurrent_analyses: usize,
    pub candidate_timeout: Duration,
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_batch_size: 10,
            max_concurrent_analyses: 4,
            candidate_timeout: Duration::from_millis(30_000),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let config = Config {
            port: parse_or("PORT", &lookup, defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            max_batch_size: parse_or("MAX_BATCH_SIZE", &lookup, defaults.max_batch_size)?,
            max_concurrent_analyses: parse_or(
                "MAX_CONCURRENT_ANALYSES",
                &lookup,
                defaults.max_concurrent_analyses,
            )?,
            candidate_timeout: Duration::from_millis(parse_or(
                "CANDIDATE_TIMEOUT_MS",
                &lookup,
                defaults.candidate_timeout.as_millis() as u64,
            )?),
            scoring: ScoringConfig {
                fit_weights: defaults.scoring.fit_weights,
                ats_weight: parse_or("ATS_WEIGHT", &lookup, defaults.scoring.ats_weight)?,
                cultural_signals_default: parse_or(
                    "CULTURAL_SIGNALS_DEFAULT",
                    &lookup,
                    defaults.scoring.cultural_signals_default,
                )?,
                min_validation_score: parse_or(
                    "MIN_VALIDATION_SCORE",
                    &lookup,
                    defaults.scoring.min_validation_score,
                )?,
            },
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            bail!("MAX_BATCH_SIZE must be at least 1");
        }
        if self.max_concurrent_analyses == 0 {
            bail!("MAX_CONCURRENT_ANALYSES must be at least 1");
        }
        if self.candidate_timeout.is_zero() {
            bail!("CANDIDATE_TIMEOUT_MS must be greater than 0");
        }
        if (self.scoring.fit_weights.total() - 1.0).abs() > 1e-6 {
            bail!("fit dimension weights must sum to 1");
        }
        if !(0.0..=1.0).contains(&self.scoring.ats_weight) {
            bail!("ATS_WEIGHT must be between 0 and 1");
        }
        if !(0.0..=100.0).contains(&self.scoring.cultural_signals_default) {
            bail!("CULTURAL_SIGNALS_DEFAULT must be between 0 and 100");
        }
        if !(0.0..=1.0).contains(&self.scoring.min_validation_score) {
            bail!("MIN_VALIDATION_SCORE must be between 0 and 1");
        }
        Ok(())
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.max_concurrent_analyses, 4);
        assert_eq!(config.candidate_timeout, Duration::from_secs(30));
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.scoring.min_validation_score, 0.5);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("ATS_WEIGHT", "0.3"),
            ("CANDIDATE_TIMEOUT_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.scoring.ats_weight, 0.3);
        assert_eq!(config.candidate_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_values_fail() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(Config::from_lookup(lookup(&[("ATS_WEIGHT", "1.5")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_CONCURRENT_ANALYSES", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_BATCH_SIZE", "0")])).is_err());
    }
}

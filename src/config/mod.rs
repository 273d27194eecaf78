use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Top-level configuration ingested once at startup: operation mode, the
/// backtest window (if any), per-session data requirements, the gap
/// filler, the lag watchdog, and the warmup multiplier every indicator's
/// lookback is scaled by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub mode: RunMode,
    pub backtest: Option<BacktestConfig>,
    pub session: SessionDataRequirements,
    pub gap_filler: GapFillerConfig,
    pub lag_watchdog: LagWatchdogConfig,
    pub warmup_multiplier: f64,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    CI,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Backtest,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub speed_multiplier: f64,
}

/// `{symbols, intervals, historical(trailing_days, intervals),
/// indicators(session[], historical[]), gap_filler}` from the
/// configuration surface, minus `gap_filler` which gets its own struct
/// since both backtest and live modes reference it independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDataRequirements {
    pub symbols: Vec<String>,
    pub intervals: Vec<String>,
    pub historical: HistoricalRequirements,
    pub session_indicators: Vec<IndicatorRequirement>,
    pub historical_indicators: Vec<IndicatorRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalRequirements {
    pub trailing_days: u32,
    pub intervals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRequirement {
    pub name: String,
    pub interval: String,
    pub period: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GapFillerConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub retry_interval_seconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LagWatchdogConfig {
    pub threshold_seconds: i64,
    pub check_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_path: PathBuf,
    pub cache_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_file = match env::var("NODE_ENV").as_deref() {
            Ok("production") => ".env.production",
            Ok("ci") => ".env.ci",
            _ => ".env.development",
        };
        dotenv::from_filename(env_file).ok();

        let config = Config {
            environment: Self::parse_environment()?,
            mode: Self::parse_mode()?,
            backtest: Self::parse_backtest_config()?,
            session: Self::parse_session_requirements()?,
            gap_filler: Self::parse_gap_filler_config()?,
            lag_watchdog: Self::parse_lag_watchdog_config()?,
            warmup_multiplier: env::var("WARMUP_MULTIPLIER")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .context("Invalid WARMUP_MULTIPLIER")?,
            paths: Self::parse_paths_config()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        match env::var("NODE_ENV").as_deref() {
            Ok("production") => Ok(Environment::Production),
            Ok("ci") => Ok(Environment::CI),
            _ => Ok(Environment::Development),
        }
    }

    fn parse_mode() -> Result<RunMode> {
        match env::var("RUN_MODE").as_deref() {
            Ok("live") => Ok(RunMode::Live),
            _ => Ok(RunMode::Backtest),
        }
    }

    fn parse_backtest_config() -> Result<Option<BacktestConfig>> {
        if env::var("RUN_MODE").as_deref() == Ok("live") {
            return Ok(None);
        }
        let start_date = env::var("BACKTEST_START")
            .unwrap_or_else(|_| "2024-01-02".to_string())
            .parse()
            .context("Invalid BACKTEST_START")?;
        let end_date = env::var("BACKTEST_END")
            .unwrap_or_else(|_| "2024-01-02".to_string())
            .parse()
            .context("Invalid BACKTEST_END")?;
        let speed_multiplier = env::var("BACKTEST_SPEED_MULTIPLIER")
            .unwrap_or_else(|_| "60.0".to_string())
            .parse()
            .context("Invalid BACKTEST_SPEED_MULTIPLIER")?;
        Ok(Some(BacktestConfig { start_date, end_date, speed_multiplier }))
    }

    fn parse_session_requirements() -> Result<SessionDataRequirements> {
        let symbols = env::var("SESSION_SYMBOLS")
            .unwrap_or_else(|_| "AAPL".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let intervals = env::var("SESSION_INTERVALS")
            .unwrap_or_else(|_| "1m,5m".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let trailing_days = env::var("HISTORICAL_TRAILING_DAYS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("Invalid HISTORICAL_TRAILING_DAYS")?;

        Ok(SessionDataRequirements {
            symbols,
            intervals,
            historical: HistoricalRequirements { trailing_days, intervals: vec!["1d".to_string()] },
            session_indicators: Vec::new(),
            historical_indicators: Vec::new(),
        })
    }

    fn parse_gap_filler_config() -> Result<GapFillerConfig> {
        Ok(GapFillerConfig {
            enabled: env::var("GAP_FILLER_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            max_retries: env::var("GAP_FILLER_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid GAP_FILLER_MAX_RETRIES")?,
            retry_interval_seconds: env::var("GAP_FILLER_RETRY_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid GAP_FILLER_RETRY_INTERVAL_SECONDS")?,
        })
    }

    fn parse_lag_watchdog_config() -> Result<LagWatchdogConfig> {
        Ok(LagWatchdogConfig {
            threshold_seconds: env::var("LAG_WATCHDOG_THRESHOLD_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid LAG_WATCHDOG_THRESHOLD_SECONDS")?,
            check_interval_seconds: env::var("LAG_WATCHDOG_CHECK_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid LAG_WATCHDOG_CHECK_INTERVAL_SECONDS")?,
        })
    }

    fn parse_paths_config() -> Result<PathsConfig> {
        Ok(PathsConfig {
            data_path: PathBuf::from(env::var("DATA_PATH").unwrap_or_else(|_| "./data".to_string())),
            cache_path: PathBuf::from(env::var("CACHE_PATH").unwrap_or_else(|_| "./data/cache".to_string())),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.session.symbols.is_empty() {
            anyhow::bail!("At least one symbol must be configured");
        }
        if self.session.intervals.is_empty() {
            anyhow::bail!("At least one interval must be configured");
        }
        if self.warmup_multiplier <= 0.0 {
            anyhow::bail!("Warmup multiplier must be > 0");
        }
        if let Some(backtest) = &self.backtest {
            if backtest.end_date < backtest.start_date {
                anyhow::bail!("Backtest end_date must not precede start_date");
            }
            if backtest.speed_multiplier <= 0.0 {
                anyhow::bail!("Backtest speed_multiplier must be > 0");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_validates_with_defaults() {
        std::env::set_var("NODE_ENV", "ci");
        std::env::remove_var("RUN_MODE");
        let config = Config::load();
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.mode, RunMode::Backtest);
        assert!(config.backtest.is_some());
    }

    #[test]
    fn live_mode_has_no_backtest_window() {
        std::env::set_var("NODE_ENV", "ci");
        std::env::set_var("RUN_MODE", "live");
        let config = Config::load().unwrap();
        assert_eq!(config.mode, RunMode::Live);
        assert!(config.backtest.is_none());
        std::env::remove_var("RUN_MODE");
    }
}

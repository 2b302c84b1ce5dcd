use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Seconds between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub interval: Duration,
    /// Stop after this many polls even if jobs are still pending.
    pub max_ticks: Option<u64>,
    /// Stop once this much time has passed even if jobs are still pending.
    pub max_elapsed: Option<Duration>,
    pub skip_download: bool,
    pub output_folder: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_ticks: None,
            max_elapsed: None,
            skip_download: false,
            output_folder: PathBuf::from("."),
        }
    }
}

#[derive(Default)]
pub struct MonitorConfigBuilder {
    interval: Option<Duration>,
    max_ticks: Option<u64>,
    max_elapsed: Option<Duration>,
    skip_download: Option<bool>,
    output_folder: Option<PathBuf>,
}

impl MonitorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
    pub fn max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }
    pub fn max_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_elapsed = Some(elapsed);
        self
    }
    pub fn skip_download(mut self, skip: bool) -> Self {
        self.skip_download = Some(skip);
        self
    }
    pub fn output_folder(mut self, folder: PathBuf) -> Self {
        self.output_folder = Some(folder);
        self
    }

    pub fn build(self) -> Result<MonitorConfig, ConfigError> {
        if self.max_ticks == Some(0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_ticks",
                reason: "must be at least 1",
            });
        }
        if self.max_elapsed == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_elapsed",
                reason: "must be greater than zero",
            });
        }
        let defaults = MonitorConfig::default();
        Ok(MonitorConfig {
            interval: self.interval.unwrap_or(defaults.interval),
            max_ticks: self.max_ticks,
            max_elapsed: self.max_elapsed,
            skip_download: self.skip_download.unwrap_or(defaults.skip_download),
            output_folder: self.output_folder.unwrap_or(defaults.output_folder),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default_config() {
        assert_eq!(
            MonitorConfigBuilder::new().build().unwrap(),
            MonitorConfig::default()
        );
        assert_eq!(MonitorConfig::default().interval, Duration::from_secs(10));
    }

    #[test]
    fn builder_applies_every_setter() {
        let config = MonitorConfigBuilder::new()
            .interval(Duration::from_millis(1))
            .max_ticks(3)
            .max_elapsed(Duration::from_secs(60))
            .skip_download(true)
            .output_folder(PathBuf::from("out"))
            .build()
            .unwrap();
        assert_eq!(config.interval, Duration::from_millis(1));
        assert_eq!(config.max_ticks, Some(3));
        assert_eq!(config.max_elapsed, Some(Duration::from_secs(60)));
        assert!(config.skip_download);
        assert_eq!(config.output_folder, PathBuf::from("out"));
    }

    #[test]
    fn zero_ceilings_are_rejected() {
        assert!(MonitorConfigBuilder::new().max_ticks(0).build().is_err());
        assert!(
            MonitorConfigBuilder::new()
                .max_elapsed(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}

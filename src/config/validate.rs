// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DurableTaskError, Result};

/// Lower bound for `[poll].interval_ms`; anything tighter just hammers the
/// (possibly remote) filesystem.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DurableTaskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.launch, raw.poll))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_poll(cfg)?;
    Ok(())
}

fn validate_poll(cfg: &RawConfigFile) -> Result<()> {
    if cfg.poll.interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(DurableTaskError::ConfigError(format!(
            "[poll].interval_ms must be >= {} (got {})",
            MIN_POLL_INTERVAL_MS, cfg.poll.interval_ms
        )));
    }

    if cfg.poll.stale_after_secs > 0
        && cfg.poll.stale_after_secs.saturating_mul(1000) < cfg.poll.interval_ms
    {
        return Err(DurableTaskError::ConfigError(format!(
            "[poll].stale_after_secs ({}s) is shorter than one poll interval ({}ms)",
            cfg.poll.stale_after_secs, cfg.poll.interval_ms
        )));
    }

    Ok(())
}

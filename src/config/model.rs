// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::poll::PollOptions;
use crate::types::Platform;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [launch]
/// platform = "windows"
/// mirror_output = true
///
/// [poll]
/// interval_ms = 500
/// stale_after_secs = 3600
/// fs_events = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub launch: LaunchSection,

    #[serde(default)]
    pub poll: PollSection,
}

/// `[launch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchSection {
    /// Platform class of the target; defaults to the host's.
    #[serde(default)]
    pub platform: Option<Platform>,

    /// Mirror the child's stdout/stderr to the live log while it runs.
    #[serde(default = "default_true")]
    pub mirror_output: bool,
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            platform: None,
            mirror_output: true,
        }
    }
}

/// `[poll]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// `0` disables the staleness timeout.
    #[serde(default)]
    pub stale_after_secs: u64,

    #[serde(default = "default_true")]
    pub fs_events: bool,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            stale_after_secs: 0,
            fs_events: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    1000
}

/// Validated configuration. Build it from a [`RawConfigFile`] with
/// `ConfigFile::try_from`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    launch: LaunchSection,
    poll: PollSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(launch: LaunchSection, poll: PollSection) -> Self {
        Self { launch, poll }
    }

    pub fn platform(&self) -> Platform {
        self.launch.platform.unwrap_or_default()
    }

    pub fn mirror_output(&self) -> bool {
        self.launch.mirror_output
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.poll.interval_ms),
            stale_after: (self.poll.stale_after_secs > 0)
                .then(|| Duration::from_secs(self.poll.stale_after_secs)),
            fs_events: self.poll.fs_events,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(LaunchSection::default(), PollSection::default())
    }
}

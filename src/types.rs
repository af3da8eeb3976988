use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Class of the machine the script runs on.
///
/// This only decides interpreter flavour and text encoding; it is not tied to
/// the platform the controller itself runs on (a controller can prepare a
/// Windows control directory on a shared drive from Linux).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// PowerShell 7+ (`pwsh`), no BOM in source files.
    Posix,
    /// Windows PowerShell (`powershell.exe`), BOM-prefixed source files.
    Windows,
}

impl Platform {
    /// The platform of the running host.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "posix" | "unix" | "linux" | "macos" => Ok(Platform::Posix),
            "windows" | "win" => Ok(Platform::Windows),
            other => Err(format!(
                "invalid platform: {other} (expected \"posix\" or \"windows\")"
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Posix => f.write_str("posix"),
            Platform::Windows => f.write_str("windows"),
        }
    }
}

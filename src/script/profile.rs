// src/script/profile.rs

use std::path::Path;

use crate::types::Platform;

/// UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Everything that differs between PowerShell flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterProfile {
    pub binary: &'static str,
    pub flags: &'static [&'static str],
    /// Prefix materialised script files with [`UTF8_BOM`].
    pub bom: bool,
    /// Line terminator used in generated script text.
    pub line_ending: &'static str,
}

const POSIX_PROFILE: InterpreterProfile = InterpreterProfile {
    binary: "pwsh",
    flags: &["-NoProfile", "-NonInteractive"],
    bom: false,
    line_ending: "\n",
};

// Windows PowerShell only reads non-ASCII source correctly when a BOM is
// present.
const WINDOWS_PROFILE: InterpreterProfile = InterpreterProfile {
    binary: "powershell.exe",
    flags: &["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass"],
    bom: true,
    line_ending: "\r\n",
};

impl InterpreterProfile {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Posix => POSIX_PROFILE,
            Platform::Windows => WINDOWS_PROFILE,
        }
    }

    /// Flags joined with single spaces, as they appear inside scripts.
    pub fn flags_line(&self) -> String {
        self.flags.join(" ")
    }

    /// Convert `\n`-terminated generated text to this profile's line endings.
    pub fn normalize_newlines(&self, text: &str) -> String {
        if self.line_ending == "\n" {
            return text.to_string();
        }
        text.replace("\r\n", "\n").replace('\n', self.line_ending)
    }
}

impl Platform {
    pub fn profile(self) -> InterpreterProfile {
        InterpreterProfile::for_platform(self)
    }
}

/// Encode script text for the given profile: UTF-8, BOM-prefixed when the
/// profile asks for it. The text itself is never altered.
pub fn encode_script(profile: &InterpreterProfile, text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if profile.bom {
        bytes.extend_from_slice(&UTF8_BOM);
    }
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Quote a path for use inside a single-quoted fragment of the launch command.
///
/// Only `$` is escaped (as `` `$ ``); control file names are generated, so no
/// other character needs care.
pub fn quote_path(path: &Path) -> String {
    path.to_string_lossy().replace('$', "`$")
}

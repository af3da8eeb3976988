// src/workspace.rs

//! Workspace root and control-directory allocation.
//!
//! Control directories are kept out of the workspace itself, in a sibling
//! temp directory:
//!
//! `<parent>/<workspace-name>@tmp/durable-<8 hex>`
//!
//! so scripts that walk or clean their working directory never see them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use blake3::Hasher;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Prefix of every control directory name.
pub const CONTROL_DIR_PREFIX: &str = "durable-";

/// Suffix appended to the workspace name to form the temp sibling.
pub const TMP_SUFFIX: &str = "@tmp";

const MAX_ALLOCATION_ATTEMPTS: usize = 16;

static ALLOCATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A workspace root plus the filesystem it lives on.
///
/// Cheap to clone; rebuilt freely after a controller restart.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl Workspace {
    /// Create the root if needed and make it absolute.
    ///
    /// Paths end up quoted inside the launch command, so they must be
    /// absolute and in the plain form Windows PowerShell accepts.
    pub fn open(root: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let root = root.as_ref();
        fs.create_dir_all(root)?;
        let root = plain_path(&fs.absolute(root)?);
        Ok(Self { root, fs })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Sibling directory holding all control directories of this workspace.
    pub fn tmp_dir(&self) -> PathBuf {
        match (self.root.parent(), self.root.file_name()) {
            (Some(parent), Some(name)) => {
                let mut sibling = name.to_os_string();
                sibling.push(TMP_SUFFIX);
                parent.join(sibling)
            }
            _ => self.root.join(TMP_SUFFIX),
        }
    }

    /// Absolute path of the control directory with the given id.
    pub fn control_dir(&self, id: &str) -> PathBuf {
        self.tmp_dir().join(id)
    }

    /// Saved [`crate::controller::Controller`] for `id`, kept next to (not
    /// inside) its control directory.
    pub fn handle_file(&self, id: &str) -> PathBuf {
        self.tmp_dir().join(format!("{id}.toml"))
    }

    /// Create a fresh, never-used control directory and return its id.
    pub fn allocate_control_dir(&self) -> Result<String> {
        self.fs.create_dir_all(&self.tmp_dir())?;
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = new_control_id();
            let dir = self.control_dir(&id);
            if !self.fs.create_dir(&dir)? {
                debug!(control_dir = ?dir, "control directory id collision; retrying");
                continue;
            }
            debug!(control_dir = ?dir, "allocated control directory");
            return Ok(id);
        }

        Err(anyhow!(
            "could not allocate a unique control directory under {:?}",
            self.tmp_dir()
        )
        .into())
    }
}

/// `durable-` followed by 8 hex chars of a blake3 digest over pid, wall clock
/// and a process-wide counter.
pub fn new_control_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = ALLOCATION_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Hasher::new();
    hasher.update(&std::process::id().to_le_bytes());
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&seq.to_le_bytes());
    let hex = hasher.finalize().to_hex();

    format!("{CONTROL_DIR_PREFIX}{}", &hex.as_str()[..8])
}

/// Strip a Windows verbatim prefix: `\\?\C:\x` becomes `C:\x` and
/// `\\?\UNC\srv\share` becomes `\\srv\share`. Other paths are returned
/// unchanged.
pub fn plain_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix(r"\\?\UNC\") {
        PathBuf::from(format!(r"\\{rest}"))
    } else if let Some(rest) = text.strip_prefix(r"\\?\") {
        PathBuf::from(rest)
    } else {
        path.to_path_buf()
    }
}

// src/script/materialize.rs

use std::path::PathBuf;

use tracing::debug;

use crate::controller::Controller;
use crate::errors::Result;
use crate::script::helper::{render_helper, render_wrapper};
use crate::script::profile::{InterpreterProfile, encode_script};
use crate::workspace::Workspace;

/// Absolute paths of the three materialised scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFiles {
    pub helper: PathBuf,
    pub script: PathBuf,
    pub wrapper: PathBuf,
}

/// Write helper, main script and wrapper into the controller's control
/// directory, encoded for `profile`.
///
/// The user script body is written byte-for-byte (plus BOM where required);
/// only generated text gets the profile's line endings. On error, files
/// written so far are left in place.
pub fn materialize(
    ws: &Workspace,
    controller: &Controller,
    body: &str,
    profile: &InterpreterProfile,
) -> Result<ScriptFiles> {
    let files = ScriptFiles {
        helper: controller.helper_file(ws),
        script: controller.script_file(ws),
        wrapper: controller.wrapper_file(ws),
    };

    let helper = render_helper(profile)?;
    let wrapper = render_wrapper(profile, &files.script)?;

    ws.fs().write(&files.helper, &encode_script(profile, &helper))?;
    ws.fs().write(&files.script, &encode_script(profile, body))?;
    ws.fs().write(&files.wrapper, &encode_script(profile, &wrapper))?;

    debug!(
        task = %controller.id(),
        bom = profile.bom,
        script_bytes = body.len(),
        "materialized powershell scripts"
    );

    Ok(files)
}

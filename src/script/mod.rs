// src/script/mod.rs

//! PowerShell script generation.
//!
//! - [`profile`] maps a [`Platform`] to the interpreter binary, flags and
//!   text encoding rules.
//! - [`template`] is the placeholder engine the generated scripts use.
//! - [`helper`] holds the generated helper/wrapper/command templates and the
//!   helper's exit-code policy.
//! - [`materialize`] writes the three script files into a control directory.

pub mod helper;
pub mod materialize;
pub mod profile;
pub mod template;

pub use helper::{ExitCodePolicy, LINE_WRAP_WIDTH};
pub use materialize::{ScriptFiles, materialize};
pub use profile::{InterpreterProfile, UTF8_BOM, encode_script, quote_path};
pub use template::Template;

pub use crate::types::Platform;

// src/script/helper.rs

//! Generated PowerShell: helper library, wrapper and launch command.
//!
//! The helper's `Execute-AndWriteOutput` is what actually runs inside the
//! detached process. Its observable contract:
//!
//! 1. console and helper-written files use UTF-8 without BOM;
//! 2. the log file is created up front and written through an auto-flushing
//!    writer;
//! 3. when capturing, stdout is teed into the output file at a fixed line
//!    width, and every stream (stdout included) goes into the log;
//! 4. thrown errors are caught and their text logged;
//! 5. the exit code is resolved as in [`ExitCodePolicy`];
//! 6. missing log/output files are created, writers flushed and closed;
//! 7. only then is the result file written, and the process exits.

use std::path::Path;

use crate::errors::Result;
use crate::script::profile::{InterpreterProfile, quote_path};
use crate::script::template::Template;

/// `Out-String -Width` used for both the log and the output file.
pub const LINE_WRAP_WIDTH: usize = 192;

/// Name of the orchestration function defined by the helper.
pub const ENTRY_POINT: &str = "Execute-AndWriteOutput";

pub const HELPER_TEMPLATE: Template = Template::new(
    r#"function New-StreamWriter {
[CmdletBinding()]
param (
  [Parameter(Mandatory=$true)] [string] $FilePath,
  [Parameter(Mandatory=$true)] [System.Text.Encoding] $Encoding
)
  [string]$FullFilePath = [IO.Path]::GetFullPath( $FilePath );
  [System.IO.StreamWriter]$writer = [System.IO.StreamWriter]::new( $FullFilePath, $true, $Encoding );
  $writer.AutoFlush = $true;
  return $writer;
}

function Out-FileNoBom {
[CmdletBinding()]
param(
  [Parameter(Mandatory=$true, Position=0)] [System.IO.StreamWriter] $Writer,
  [Parameter(ValueFromPipeline = $true)]   [object] $InputObject
)
  Process {
    $InputObject | Out-String -Stream -Width {{line_width}} | ForEach-Object { $Writer.WriteLine( $_ ); }
  }
}

function Execute-AndWriteOutput {
[CmdletBinding()]
param(
  [Parameter(Mandatory=$true)]  [string]$MainScript,
  [Parameter(Mandatory=$false)] [string]$OutputFile,
  [Parameter(Mandatory=$true)]  [string]$LogFile,
  [Parameter(Mandatory=$true)]  [string]$ResultFile,
  [Parameter(Mandatory=$false)] [switch]$CaptureOutput
)
  $exceptionCaught = $null;
  $LogWriter = $null;
  $OutputWriter = $null;
  try {
    [System.Text.Encoding] $encoding = [System.Text.UTF8Encoding]::new( $false );
    [System.Console]::OutputEncoding = [System.Console]::InputEncoding = $encoding;
    [System.IO.Directory]::SetCurrentDirectory( $PWD );
    $null = New-Item $LogFile -ItemType File -Force;
    $LogWriter = New-StreamWriter -FilePath $LogFile -Encoding $encoding;
    if ($CaptureOutput -eq $true) {
      $null = New-Item $OutputFile -ItemType File -Force;
      $OutputWriter = New-StreamWriter -FilePath $OutputFile -Encoding $encoding;
    }
    & {
      if ($CaptureOutput -eq $true) {
        & $MainScript | ForEach-Object { $_ | Out-FileNoBom -Writer $OutputWriter; $_ };
      } else {
        & $MainScript;
      }
    } *>&1 | Out-FileNoBom -Writer $LogWriter;
  } catch {
    $exceptionCaught = $_;
    if ($LogWriter -ne $null) {
      $exceptionCaught | Out-String -Width {{line_width}} | Out-FileNoBom -Writer $LogWriter;
    }
    $exceptionCaught = $true;
  } finally {
    $succeeded = $?;
    $nativeExitCode = $LastExitCode;
    $exitCode = 0;
    if ($nativeExitCode -ne $null) {
      if ($nativeExitCode -eq 0 -and !$succeeded) {
        $exitCode = 1;
      } else {
        $exitCode = $nativeExitCode;
      }
    } elseif ($exceptionCaught -ne $null -or !$succeeded) {
      $exitCode = 1;
    }
    if ($CaptureOutput -eq $true -and !(Test-Path $OutputFile)) {
      $null = New-Item $OutputFile -ItemType File -Force;
    }
    if (!(Test-Path $LogFile)) {
      $null = New-Item $LogFile -ItemType File -Force;
    }
    if ($OutputWriter -ne $null) {
      $OutputWriter.Flush();
      $OutputWriter.Dispose();
    }
    if ($LogWriter -ne $null) {
      $LogWriter.Flush();
      $LogWriter.Dispose();
    }
    $exitCode | Out-File -FilePath $ResultFile -Encoding ASCII;
    exit $exitCode;
  }
}
"#,
);

pub const WRAPPER_TEMPLATE: Template = Template::new(
    "[CmdletBinding()]\nparam()\n{{binary}} {{flags}} -File '{{script}}';\n",
);

pub const COMMAND_TEMPLATE: Template = Template::new(
    ". '{{helper}}'; Execute-AndWriteOutput -MainScript '{{wrapper}}' -LogFile '{{log}}' -ResultFile '{{result}}';",
);

pub const CAPTURING_COMMAND_TEMPLATE: Template = Template::new(
    ". '{{helper}}'; Execute-AndWriteOutput -MainScript '{{wrapper}}' -OutputFile '{{output}}' -LogFile '{{log}}' -ResultFile '{{result}}' -CaptureOutput;",
);

/// Render the helper library with the profile's line endings.
pub fn render_helper(profile: &InterpreterProfile) -> Result<String> {
    let width = LINE_WRAP_WIDTH.to_string();
    let text = HELPER_TEMPLATE.render(&[("line_width", width.as_str())])?;
    Ok(profile.normalize_newlines(&text))
}

/// Render the wrapper that re-invokes the interpreter on the main script.
pub fn render_wrapper(profile: &InterpreterProfile, script: &Path) -> Result<String> {
    let flags = profile.flags_line();
    let script = quote_path(script);
    let text = WRAPPER_TEMPLATE.render(&[
        ("binary", profile.binary),
        ("flags", flags.as_str()),
        ("script", script.as_str()),
    ])?;
    Ok(profile.normalize_newlines(&text))
}

/// Absolute paths the launch command refers to.
#[derive(Debug, Clone, Copy)]
pub struct CommandPaths<'a> {
    pub helper: &'a Path,
    pub wrapper: &'a Path,
    pub log: &'a Path,
    pub result: &'a Path,
    /// `Some` switches the command into capturing mode.
    pub output: Option<&'a Path>,
}

/// Render the inline `-Command` argument.
pub fn render_command(paths: &CommandPaths<'_>) -> Result<String> {
    let helper = quote_path(paths.helper);
    let wrapper = quote_path(paths.wrapper);
    let log = quote_path(paths.log);
    let result = quote_path(paths.result);

    match paths.output {
        Some(output) => {
            let output = quote_path(output);
            CAPTURING_COMMAND_TEMPLATE.render(&[
                ("helper", helper.as_str()),
                ("wrapper", wrapper.as_str()),
                ("output", output.as_str()),
                ("log", log.as_str()),
                ("result", result.as_str()),
            ])
        }
        None => COMMAND_TEMPLATE.render(&[
            ("helper", helper.as_str()),
            ("wrapper", wrapper.as_str()),
            ("log", log.as_str()),
            ("result", result.as_str()),
        ]),
    }
}

/// The helper's exit-code resolution, restated in Rust.
///
/// Inputs are the three signals the helper sees in its `finally` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodePolicy {
    /// `$LastExitCode`: exit code of the last native command, if any ran.
    pub last_exit_code: Option<i32>,
    /// `$?`: whether the last command reported success.
    pub succeeded: bool,
    /// Whether the helper's `catch` block ran.
    pub error_caught: bool,
}

impl ExitCodePolicy {
    pub fn resolve(&self) -> i32 {
        match self.last_exit_code {
            // Compatibility quirk: a zero native code is overridden when the
            // host reports failure, even though the two signals are unrelated.
            Some(0) if !self.succeeded => 1,
            Some(code) => code,
            None if self.error_caught || !self.succeeded => 1,
            None => 0,
        }
    }
}

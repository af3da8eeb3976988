// src/task.rs

//! The PowerShell task definition and its launch sequence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::controller::Controller;
use crate::errors::Result;
use crate::exec::{LaunchSpec, ProcessLauncher};
use crate::script::helper::{CommandPaths, render_command};
use crate::script::{InterpreterProfile, materialize};
use crate::types::Platform;
use crate::workspace::Workspace;

/// Per-launch knobs that are not part of the task definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Platform class of the machine that runs the script.
    pub platform: Platform,
    /// Extra environment for the child, on top of the inherited one.
    pub envs: BTreeMap<String, String>,
    /// Mirror the child's stdout/stderr to the launcher's live log.
    pub mirror_output: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            envs: BTreeMap::new(),
            mirror_output: true,
        }
    }
}

/// A PowerShell script to run durably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowershellScript {
    script: String,
    #[serde(default)]
    capturing_output: bool,
}

impl PowershellScript {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            capturing_output: false,
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    /// Also capture the script's stdout into a separate output file.
    ///
    /// Must be called before [`PowershellScript::launch`].
    pub fn capture_output(&mut self) {
        self.capturing_output = true;
    }

    pub fn capturing_output(&self) -> bool {
        self.capturing_output
    }

    /// Allocate a control directory, write the scripts and start the
    /// interpreter detached.
    ///
    /// Returns as soon as the process has started. Any error here means the
    /// task never ran and no result file will appear.
    pub async fn launch(
        &self,
        ws: &Workspace,
        launcher: &dyn ProcessLauncher,
        options: &LaunchOptions,
    ) -> Result<Controller> {
        let id = ws.allocate_control_dir()?;
        let controller = Controller::attach(id, self.capturing_output);
        let profile = options.platform.profile();

        materialize(ws, &controller, &self.script, &profile)?;

        let args = self.command_line(ws, &controller, &profile)?;
        let spec = LaunchSpec {
            task: controller.id().to_string(),
            program: profile.binary.to_string(),
            args,
            cwd: ws.root().to_path_buf(),
            envs: options.envs.clone(),
            mirror_output: options.mirror_output,
            banner: format!("[{}] Running PowerShell script", workspace_name(ws)),
        };

        match launcher.launch(spec).await {
            Ok(process) => {
                info!(
                    task = %controller.id(),
                    platform = %options.platform,
                    capturing_output = self.capturing_output,
                    pid = ?process.pid,
                    "launched powershell task"
                );
                Ok(controller)
            }
            Err(err) => {
                error!(task = %controller.id(), error = %err, "failed to launch powershell task");
                Err(err)
            }
        }
    }

    /// Interpreter arguments: platform flags, then `-Command` and the inline
    /// helper invocation.
    pub fn command_line(
        &self,
        ws: &Workspace,
        controller: &Controller,
        profile: &InterpreterProfile,
    ) -> Result<Vec<String>> {
        let helper = controller.helper_file(ws);
        let wrapper = controller.wrapper_file(ws);
        let log = controller.log_file(ws);
        let result = controller.result_file(ws);
        let output = controller.output_file(ws);

        let command = render_command(&CommandPaths {
            helper: &helper,
            wrapper: &wrapper,
            log: &log,
            result: &result,
            output: self.capturing_output.then_some(output.as_path()),
        })?;

        let mut args: Vec<String> = profile.flags.iter().map(|f| f.to_string()).collect();
        args.push("-Command".to_string());
        args.push(command);
        Ok(args)
    }
}

fn workspace_name(ws: &Workspace) -> String {
    ws.root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ws.root().to_string_lossy().into_owned())
}

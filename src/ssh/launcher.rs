// ABOUTME: Terminal session launcher building the command line from the configured template
// ABOUTME: Process spawning goes through an injectable starter so launches can be tested

use crate::config::{SshConfig, TerminalConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// A fully built process description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Starts a process without waiting for it.
pub trait ProcessStarter {
    fn start(&self, request: &LaunchRequest) -> Result<()>;
}

impl<T: ProcessStarter + ?Sized> ProcessStarter for &T {
    fn start(&self, request: &LaunchRequest) -> Result<()> {
        (**self).start(request)
    }
}

/// Starter backed by `std::process::Command`.
pub struct SystemProcessStarter;

impl ProcessStarter for SystemProcessStarter {
    fn start(&self, request: &LaunchRequest) -> Result<()> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("Spawning terminal: {:?}", cmd);

        // The child is detached, nothing waits on it
        cmd.spawn().with_context(|| {
            format!(
                "Failed to launch terminal: {} with args: {:?}",
                request.program.display(),
                request.args
            )
        })?;

        Ok(())
    }
}

pub struct SessionLauncher<S: ProcessStarter> {
    terminal: TerminalConfig,
    connect_command: String,
    starter: S,
}

impl<S: ProcessStarter> SessionLauncher<S> {
    pub fn new(terminal: TerminalConfig, ssh: &SshConfig, starter: S) -> Self {
        Self {
            terminal,
            connect_command: ssh.connect_command.clone(),
            starter,
        }
    }

    /// Open a terminal connected to `target`.
    ///
    /// Returns `Ok(false)` when no terminal is configured and nothing ran.
    pub fn launch(&self, target: &str) -> Result<bool> {
        if self.terminal.program.is_empty() {
            tracing::debug!("No terminal configured, not launching {}", target);
            return Ok(false);
        }

        tracing::debug!("Launching SSH connection to host: {}", target);

        let request = self.build_request(target, &current_shell())?;
        self.starter.start(&request)?;

        tracing::info!("Launched terminal for host: {}", target);
        Ok(true)
    }

    fn build_request(&self, target: &str, shell: &str) -> Result<LaunchRequest> {
        let program = which::which(&self.terminal.program).with_context(|| {
            format!("Terminal program not found: {}", self.terminal.program)
        })?;

        Ok(LaunchRequest {
            program,
            args: vec![self.terminal.arg.clone(), self.render_command(target, shell)],
            working_dir: dirs::home_dir(),
        })
    }

    fn render_command(&self, target: &str, shell: &str) -> String {
        let connection = self
            .connect_command
            .replace("%HOST", &escape_for_double_quotes(target));

        self.terminal
            .command
            .replace("%SHELL", shell)
            .replace("%CONN", &connection)
    }
}

fn current_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

/// Escape the characters a double-quoted shell string still interprets.
fn escape_for_double_quotes(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

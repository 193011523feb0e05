// ABOUTME: Configuration structures for the terminal launch template and SSH source files
// ABOUTME: Loads TOML from disk and applies launcher preference maps as new immutable values

use crate::ssh::IncludeMatches;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PREF_TERMINAL: &str = "ssh_launcher_terminal";
pub const PREF_TERMINAL_ARG: &str = "ssh_launcher_terminal_arg";
pub const PREF_TERMINAL_CMD: &str = "ssh_launcher_terminal_cmd";
pub const PREF_USE_KNOWN_HOSTS: &str = "ssh_launcher_use_known_hosts";
pub const PREF_DEDUP_BY_HOSTNAME: &str = "ssh_launcher_dedup_by_hostname";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub terminal: TerminalConfig,
    pub ssh: SshConfig,
    pub hosts: HostsConfig,
}

/// How a session is launched: `program arg command`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    pub program: String,
    pub arg: String,
    pub command: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SshConfig {
    pub directory: String,
    pub config_path: String,
    pub known_hosts_path: String,
    pub connect_command: String,
    pub include_matches: IncludeMatches,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostsConfig {
    pub use_known_hosts: bool,
    pub dedup_by_hostname: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            program: "x-terminal-emulator".to_string(),
            arg: "-e".to_string(),
            command: "%SHELL -c \"%CONN\"".to_string(),
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        SshConfig {
            directory: "~/.ssh".to_string(),
            config_path: "~/.ssh/config".to_string(),
            known_hosts_path: "~/.ssh/known_hosts".to_string(),
            connect_command: "ssh %HOST".to_string(),
            include_matches: IncludeMatches::All,
        }
    }
}

impl Default for HostsConfig {
    fn default() -> Self {
        HostsConfig {
            use_known_hosts: true,
            dedup_by_hostname: true,
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# ssh-launcher configuration

[terminal]
# The session is started as: <program> <arg> <command>
# %SHELL is replaced with $SHELL, %CONN with the connect command below.
# %CONN is escaped for use inside a double-quoted string.
program = "x-terminal-emulator"
arg = "-e"
command = "%SHELL -c \"%CONN\""

# Kitty:
# program = "kitty"
# arg = "--"

# GNOME Terminal:
# program = "gnome-terminal"
# arg = "--"
# command = "%SHELL -c \"%CONN; exec %SHELL\""

[ssh]
# SSH file locations, Include patterns resolve against `directory`
directory = "~/.ssh"
config_path = "~/.ssh/config"
known_hosts_path = "~/.ssh/known_hosts"
# %HOST is replaced with the selected host
connect_command = "ssh %HOST"
# "all" follows every file an Include glob matches, "first" only the first
include_matches = "all"

[hosts]
# Offer hosts from known_hosts next to the ones from ssh config
use_known_hosts = true
# Hide known_hosts entries already reachable through a HostName
dedup_by_hostname = true
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("ssh-launcher").join("config.toml"))
    }

    pub fn expand_paths(&mut self) -> Result<()> {
        self.ssh.directory = expand_tilde(&self.ssh.directory)?;
        self.ssh.config_path = expand_tilde(&self.ssh.config_path)?;
        self.ssh.known_hosts_path = expand_tilde(&self.ssh.known_hosts_path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // An empty program is allowed and turns launching off
        if !self.terminal.program.is_empty() && !self.terminal.command.contains("%CONN") {
            anyhow::bail!("Terminal command must contain the %CONN placeholder");
        }

        if !self.ssh.connect_command.contains("%HOST") {
            anyhow::bail!("Connect command must contain the %HOST placeholder");
        }

        if self.ssh.directory.is_empty() {
            anyhow::bail!("SSH directory cannot be empty");
        }

        Ok(())
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }

    /// Build a configuration from a full launcher preference map.
    ///
    /// Keys missing from the map keep their current value.
    pub fn with_preferences(&self, preferences: &HashMap<String, String>) -> Self {
        preferences
            .iter()
            .fold(self.clone(), |config, (id, value)| config.with_preference(id, value))
    }

    /// Apply a single preference change, returning the updated configuration.
    pub fn with_preference(&self, id: &str, value: &str) -> Self {
        let mut config = self.clone();

        match id {
            PREF_TERMINAL => config.terminal.program = value.to_string(),
            PREF_TERMINAL_ARG => config.terminal.arg = value.to_string(),
            PREF_TERMINAL_CMD => config.terminal.command = value.to_string(),
            PREF_USE_KNOWN_HOSTS => config.hosts.use_known_hosts = preference_flag(value),
            PREF_DEDUP_BY_HOSTNAME => config.hosts.dedup_by_hostname = preference_flag(value),
            _ => tracing::debug!("Ignoring unknown preference: {}", id),
        }

        config
    }
}

// Launcher frameworks deliver booleans as the strings "True" / "False"
fn preference_flag(value: &str) -> bool {
    value == "True"
}

fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else if path == "~" {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

// ABOUTME: Core application state and Model-Update logic for the SSH launcher
// ABOUTME: Dispatches query, selection and preference events through the host pipeline

use crate::config::Config;
use crate::resolver::{HostResolver, ResolveOptions, ResultItem};
use crate::ssh::{KnownHostsLoader, ProcessStarter, SessionLauncher, SshConfigLoader};
use std::collections::HashMap;
use std::path::PathBuf;

pub struct AppState {
    pub config: Config,
    pub results: Vec<ResultItem>,
    pub notification: Option<String>,
    starter: Box<dyn ProcessStarter>,
}

#[derive(Debug, Clone)]
pub enum Message {
    PreferencesLoaded(HashMap<String, String>),
    PreferenceUpdated { id: String, value: String },
    Query(Option<String>),
    Launch(String),
    ClearNotification,
}

impl AppState {
    pub fn new(config: Config, starter: Box<dyn ProcessStarter>) -> Self {
        Self {
            config,
            results: Vec::new(),
            notification: None,
            starter,
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::PreferencesLoaded(preferences) => {
                self.config = self.config.with_preferences(&preferences);
            }

            Message::PreferenceUpdated { id, value } => {
                self.config = self.config.with_preference(&id, &value);
            }

            Message::Query(argument) => {
                let query = argument.unwrap_or_default();
                self.results = self.query_hosts(&query);
            }

            Message::Launch(target) => {
                self.launch_host(&target);
            }

            Message::ClearNotification => {
                self.notification = None;
            }
        }
    }

    /// Run the whole host pipeline for `query`, nothing is cached between calls.
    fn query_hosts(&self, query: &str) -> Vec<ResultItem> {
        let ssh = &self.config.ssh;
        let config_hosts = SshConfigLoader::new(
            PathBuf::from(&ssh.config_path),
            PathBuf::from(&ssh.directory),
            ssh.include_matches,
        )
        .load_hosts();

        let known_hosts = if self.config.hosts.use_known_hosts {
            KnownHostsLoader::new(PathBuf::from(&ssh.known_hosts_path)).load_known_hosts()
        } else {
            Vec::new()
        };

        let resolver = HostResolver::new(ResolveOptions {
            use_known_hosts: self.config.hosts.use_known_hosts,
            dedup_by_hostname: self.config.hosts.dedup_by_hostname,
        });
        resolver.resolve_items(&config_hosts, known_hosts, query)
    }

    fn launch_host(&mut self, target: &str) {
        let launcher = SessionLauncher::new(
            self.config.terminal.clone(),
            &self.config.ssh,
            self.starter.as_ref(),
        );

        match launcher.launch(target) {
            Ok(_) => self.notification = None,
            Err(e) => {
                tracing::error!("Failed to launch terminal for host '{}': {:#}", target, e);
                self.notification = Some(format!("Could not connect to {target}: {e:#}"));
            }
        }
    }
}

// ABOUTME: SSH file parsing and terminal launching module for SSH connections
// ABOUTME: Loads host records from ssh config (with includes) and names from known_hosts

pub mod config_loader;
pub mod include;
pub mod known_hosts;
pub mod launcher;
pub mod parser;

pub use config_loader::SshConfigLoader;
pub use include::IncludeMatches;
pub use known_hosts::KnownHostsLoader;
pub use launcher::{LaunchRequest, ProcessStarter, SessionLauncher, SystemProcessStarter};
pub use parser::HostRecord;

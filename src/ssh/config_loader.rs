// ABOUTME: Recursive SSH config loader following Include directives depth-first
// ABOUTME: Tracks visited files to stop include cycles and never fails the caller

use crate::ssh::include::{IncludeMatches, expand_include};
use crate::ssh::parser::{HostRecord, parse_config_lines};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct SshConfigLoader {
    config_path: PathBuf,
    ssh_dir: PathBuf,
    include_matches: IncludeMatches,
}

impl SshConfigLoader {
    pub fn new(config_path: PathBuf, ssh_dir: PathBuf, include_matches: IncludeMatches) -> Self {
        Self {
            config_path,
            ssh_dir,
            include_matches,
        }
    }

    /// Load every host record reachable from the primary config file.
    ///
    /// A missing or unreadable primary file gives an empty list.
    pub fn load_hosts(&self) -> Vec<HostRecord> {
        let mut hosts = Vec::new();
        let mut visited = HashSet::new();

        if let Err(e) = self.load_file(&self.config_path, &mut hosts, &mut visited) {
            tracing::debug!("SSH config not loaded: {:#}", e);
            return Vec::new();
        }

        tracing::debug!(
            "Loaded {} host(s) from {} file(s)",
            hosts.len(),
            visited.len()
        );
        hosts
    }

    fn load_file(
        &self,
        path: &Path,
        hosts: &mut Vec<HostRecord>,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(canonical.clone()) {
            tracing::debug!("Skipping already visited config file: {}", canonical.display());
            return Ok(());
        }

        let content = fs::read_to_string(&canonical)
            .with_context(|| format!("Failed to read SSH config file: {}", canonical.display()))?;
        let parsed = parse_config_lines(content.lines());

        // Hosts of this file come before anything it includes
        hosts.extend(parsed.hosts);

        for pattern in &parsed.includes {
            for include_path in expand_include(pattern, &self.ssh_dir, self.include_matches) {
                if let Err(e) = self.load_file(&include_path, hosts, visited) {
                    tracing::debug!("Skipping include: {:#}", e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader(temp_dir: &TempDir, matches: IncludeMatches) -> SshConfigLoader {
        SshConfigLoader::new(
            temp_dir.path().join("config"),
            temp_dir.path().to_path_buf(),
            matches,
        )
    }

    fn write(temp_dir: &TempDir, name: &str, content: &str) {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn names(hosts: &[HostRecord]) -> Vec<&str> {
        hosts.iter().map(|h| h.host.as_str()).collect()
    }

    #[test]
    fn test_missing_primary_config_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(loader(&temp_dir, IncludeMatches::All).load_hosts().is_empty());
    }

    #[test]
    fn test_file_hosts_come_before_included_hosts() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include work\nHost home\n  HostName home.lan\n");
        write(&temp_dir, "work", "Host office\nInclude nested\nHost lab\n");
        write(&temp_dir, "nested", "Host deep\n  HostName deep.example.com\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["home", "office", "lab", "deep"]);
        assert_eq!(hosts[0].hostname.as_deref(), Some("home.lan"));
        assert_eq!(hosts[3].hostname.as_deref(), Some("deep.example.com"));
    }

    #[test]
    fn test_includes_followed_in_declaration_order() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include second\nInclude first\n");
        write(&temp_dir, "first", "Host one\n");
        write(&temp_dir, "second", "Host two\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["two", "one"]);
    }

    #[test]
    fn test_glob_include_unions_all_matches() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include conf.d/*.conf\n");
        write(&temp_dir, "conf.d/a.conf", "Host alpha\n");
        write(&temp_dir, "conf.d/b.conf", "Host beta\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_glob_include_first_match_only() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include conf.d/*.conf\n");
        write(&temp_dir, "conf.d/a.conf", "Host alpha\n");
        write(&temp_dir, "conf.d/b.conf", "Host beta\n");

        let hosts = loader(&temp_dir, IncludeMatches::First).load_hosts();

        assert_eq!(names(&hosts), vec!["alpha"]);
    }

    #[test]
    fn test_glob_include_skips_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include conf.d/*\n");
        write(&temp_dir, "conf.d/work", "Host work\n");
        write(&temp_dir, "conf.d/.old-backup", "Host stale\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["work"]);
    }

    #[test]
    fn test_include_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Host root\nInclude a\n");
        write(&temp_dir, "a", "Host from-a\nInclude b\n");
        write(&temp_dir, "b", "Host from-b\nInclude a\nInclude config\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["root", "from-a", "from-b"]);
    }

    #[test]
    fn test_self_include_terminates() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Host only\nInclude config\nInclude *\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["only"]);
    }

    #[test]
    fn test_hostname_does_not_leak_across_files() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Host parent\nInclude child\n");
        write(&temp_dir, "child", "HostName stray.example.com\nHost kid\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(hosts[0].hostname, None);
        assert_eq!(hosts[1].hostname, None);
    }

    #[test]
    fn test_missing_include_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Include missing\nInclude none/*\nHost still-here\n");

        let hosts = loader(&temp_dir, IncludeMatches::All).load_hosts();

        assert_eq!(names(&hosts), vec!["still-here"]);
    }

    #[test]
    fn test_loading_twice_is_identical() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir, "config", "Host b\nInclude conf.d/*\nHost a\n");
        write(&temp_dir, "conf.d/x", "Host x\n");

        let loader = loader(&temp_dir, IncludeMatches::All);
        assert_eq!(loader.load_hosts(), loader.load_hosts());
    }
}

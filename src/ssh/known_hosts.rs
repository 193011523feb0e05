// ABOUTME: known_hosts parser recovering the first plain host name of every entry
// ABOUTME: Hashed, bracketed and marker entries do not match and are skipped

use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

// Leading name, then either whitespace or a comma-separated tail followed by whitespace
static HOST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9.-]*)(?:,.*)?\s").expect("valid known_hosts regex"));

pub struct KnownHostsLoader {
    path: PathBuf,
}

impl KnownHostsLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the database, a missing or unreadable file gives an empty list.
    pub fn load_known_hosts(&self) -> Vec<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_known_hosts_content(&content),
            Err(e) => {
                tracing::debug!("known_hosts not loaded from {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

pub fn parse_known_hosts_content(content: &str) -> Vec<String> {
    // Line terminators are kept so a bare name on its own line still matches
    content
        .split_inclusive('\n')
        .filter_map(parse_known_hosts_line)
        .collect()
}

fn parse_known_hosts_line(line: &str) -> Option<String> {
    let line_lc = line.to_lowercase();
    let captures = HOST_REGEX.captures(&line_lc)?;
    let host = captures.get(1)?.as_str().trim();

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_known_hosts_simple() {
        let content = "example.com ssh-rsa AAAAB3NzaC1yc2EAAAABIwAAAQEA...
server1.local ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI...
192.168.1.100 ssh-rsa AAAAB3NzaC1yc2EAAAABIwAAAQEA...";

        let hosts = parse_known_hosts_content(content);

        assert_eq!(hosts, vec!["example.com", "server1.local", "192.168.1.100"]);
    }

    #[test]
    fn test_comma_separated_takes_first_name() {
        let content = "prod.internal.example,10.0.0.1 ssh-rsa AAAAB3...\n";

        assert_eq!(parse_known_hosts_content(content), vec!["prod.internal.example"]);
    }

    #[test]
    fn test_lowercases_names() {
        let content = "Build-01.Example.COM ssh-ed25519 AAAAC3...\n";

        assert_eq!(parse_known_hosts_content(content), vec!["build-01.example.com"]);
    }

    #[test]
    fn test_skips_entries_outside_character_class() {
        let content = "|1|hash1= ssh-rsa AAAAB3NzaC1yc2EAAAABIwAAAQEA...
[example.com]:2222 ssh-rsa AAAAB3NzaC1yc2EAAAABIwAAAQEA...
@cert-authority *.example.com ssh-rsa AAAAB3...
# comment line
host_with_underscore ssh-rsa AAAAB3...
   indented.example ssh-rsa AAAAB3...

kept.example ssh-rsa AAAAB3...";

        assert_eq!(parse_known_hosts_content(content), vec!["kept.example"]);
    }

    #[test]
    fn test_bare_name_needs_trailing_whitespace() {
        assert_eq!(parse_known_hosts_content("lonely\n"), vec!["lonely"]);
        assert!(parse_known_hosts_content("lonely").is_empty());
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let content = "example.com ssh-rsa AAAA...\nexample.com ssh-ed25519 AAAA...\n";

        assert_eq!(parse_known_hosts_content(content), vec!["example.com", "example.com"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "a.example ssh-rsa AAAA\r\nb.example,1.2.3.4 ssh-rsa AAAA\r\n";

        assert_eq!(parse_known_hosts_content(content), vec!["a.example", "b.example"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loader = KnownHostsLoader::new(temp_dir.path().join("known_hosts"));

        assert!(loader.load_known_hosts().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("known_hosts");
        fs::write(&path, "staging.example ssh-ed25519 AAAA\n").unwrap();

        assert_eq!(KnownHostsLoader::new(path).load_known_hosts(), vec!["staging.example"]);
    }
}

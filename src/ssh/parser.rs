// ABOUTME: Line parser for SSH config files producing host records and include patterns
// ABOUTME: Only Host, HostName and Include directives are recognised, everything else is skipped

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostRecord {
    pub host: String,             // Alias the user connects with
    pub hostname: Option<String>, // Declared target, if any
}

impl HostRecord {
    pub fn new(host: String) -> Self {
        Self { host, hostname: None }
    }
}

/// Result of parsing a single config file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub hosts: Vec<HostRecord>,
    pub includes: Vec<String>,
}

/// Parse the lines of one config file.
///
/// `HostName` attaches to the most recently opened record of this file.
/// A `HostName` seen before any `Host` line is ignored.
pub fn parse_config_lines<'a, I>(lines: I) -> ParsedConfig
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = ParsedConfig::default();
    let mut current: Option<usize> = None;

    for line in lines {
        let trimmed = line.trim();
        let line_lc = trimmed.to_lowercase();

        if is_host_line(&line_lc) {
            parsed.hosts.push(HostRecord::new(line_lc[5..].trim().to_string()));
            current = Some(parsed.hosts.len() - 1);
            continue;
        }

        if let Some(value) = line_lc.strip_prefix("hostname ") {
            match current.and_then(|index| parsed.hosts.get_mut(index)) {
                Some(record) => record.hostname = Some(value.trim().to_string()),
                None => tracing::debug!("Ignoring HostName outside of a Host block: {}", trimmed),
            }
            continue;
        }

        if line_lc.starts_with("include ") {
            // Keep the original case, paths are case sensitive
            let pattern = trimmed.get(8..).unwrap_or_default().trim();
            if !pattern.is_empty() {
                parsed.includes.push(pattern.to_string());
            }
        }
    }

    parsed
}

/// Wildcard blocks and `HostKeyAlgorithms`-style lines never open a record.
fn is_host_line(line_lc: &str) -> bool {
    line_lc.starts_with("host ") && !line_lc.contains('*') && !line_lc.contains("keyalgorithms")
}

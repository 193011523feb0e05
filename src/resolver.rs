// ABOUTME: Merges ssh config hosts with known_hosts names into the sorted, filtered result list
// ABOUTME: Falls back to the raw query so an unknown host can still be connected to

use crate::ssh::HostRecord;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub use_known_hosts: bool,
    pub dedup_by_hostname: bool,
}

/// One entry of the query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub name: String,
    pub description: String,
    pub target: String, // Carried by the enter action
}

impl ResultItem {
    fn known(host: String) -> Self {
        Self {
            description: format!("Connect to '{host}' with SSH"),
            name: host.clone(),
            target: host,
        }
    }

    fn typed(query: &str) -> Self {
        Self {
            name: query.to_string(),
            description: format!("Connect to {query} with SSH"),
            target: query.to_string(),
        }
    }
}

pub struct HostResolver {
    options: ResolveOptions,
}

impl HostResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Sorted host names containing `query`, or `[query]` when none do.
    pub fn resolve(
        &self,
        config_hosts: &[HostRecord],
        known_hosts: Vec<String>,
        query: &str,
    ) -> Vec<String> {
        let hosts = self.matching_hosts(config_hosts, known_hosts, query);

        if hosts.is_empty() {
            vec![query.to_string()]
        } else {
            hosts
        }
    }

    /// Same as [`HostResolver::resolve`], wrapped into result items.
    pub fn resolve_items(
        &self,
        config_hosts: &[HostRecord],
        known_hosts: Vec<String>,
        query: &str,
    ) -> Vec<ResultItem> {
        let hosts = self.matching_hosts(config_hosts, known_hosts, query);

        if hosts.is_empty() {
            tracing::debug!("No host matches '{}', offering the query itself", query);
            return vec![ResultItem::typed(query)];
        }

        hosts.into_iter().map(ResultItem::known).collect()
    }

    fn matching_hosts(
        &self,
        config_hosts: &[HostRecord],
        known_hosts: Vec<String>,
        query: &str,
    ) -> Vec<String> {
        let mut known_hosts = if self.options.use_known_hosts {
            known_hosts
        } else {
            Vec::new()
        };

        if self.options.dedup_by_hostname {
            // Records without a HostName suppress nothing
            let declared: HashSet<&str> = config_hosts
                .iter()
                .filter_map(|record| record.hostname.as_deref())
                .collect();
            known_hosts.retain(|host| !declared.contains(host.as_str()));
        }

        let mut hosts: Vec<String> = config_hosts
            .iter()
            .map(|record| record.host.clone())
            .chain(known_hosts)
            .collect();
        hosts.sort();

        if !query.is_empty() {
            hosts.retain(|host| host.contains(query));
        }

        hosts
    }
}

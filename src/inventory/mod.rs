//! SimpleInventory-style YAML inventory: `hosts.yaml`, `groups.yaml`, `defaults.yaml`.
//!
//! Resolution order (lowest → highest priority):
//! 1. defaults
//! 2. groups, parents before children, later-listed groups before earlier ones
//! 3. host attributes and data, which always win

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::models::{HostEntry, DEFAULT_SSH_PORT};

/// One host, group or defaults block as written in the YAML files
#[derive(Debug, Clone, Default, Deserialize)]
struct InventoryNode {
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    data: serde_yaml::Mapping,
}

/// Ordered (name, node) pairs; YAML mapping order is preserved
type Nodes = Vec<(String, InventoryNode)>;

/// Inventory holds fully resolved hosts in file order
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub hosts: Vec<HostEntry>,
}

impl Inventory {
    /// Load `hosts.yaml` (required) plus optional `groups.yaml`/`defaults.yaml` from a directory
    pub fn load(dir: &Path) -> Result<Self> {
        let hosts = std::fs::read_to_string(dir.join("hosts.yaml"))
            .with_context(|| format!("Failed to read {}", dir.join("hosts.yaml").display()))?;
        let groups = read_optional(&dir.join("groups.yaml"))?;
        let defaults = read_optional(&dir.join("defaults.yaml"))?;

        Self::from_yaml(&hosts, groups.as_deref(), defaults.as_deref())
    }

    pub fn from_yaml(hosts: &str, groups: Option<&str>, defaults: Option<&str>) -> Result<Self> {
        let hosts = parse_nodes(hosts).context("Invalid hosts.yaml")?;
        let groups = match groups {
            Some(text) => parse_nodes(text).context("Invalid groups.yaml")?,
            None => Vec::new(),
        };
        let defaults: InventoryNode = match defaults {
            Some(text) if !text.trim().is_empty() => {
                serde_yaml::from_str(text).context("Invalid defaults.yaml")?
            }
            _ => InventoryNode::default(),
        };

        let mut resolved = Vec::with_capacity(hosts.len());
        for (name, node) in &hosts {
            resolved.push(resolve_host(name, node, &groups, &defaults)?);
        }

        Ok(Self { hosts: resolved })
    }

    /// Hosts whose platform matches `platform`; an empty filter keeps everything
    pub fn filter_platform(self, platform: &str) -> Vec<HostEntry> {
        if platform.is_empty() {
            return self.hosts;
        }
        self.hosts
            .into_iter()
            .filter(|h| h.platform.as_deref() == Some(platform))
            .collect()
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_nodes(text: &str) -> Result<Nodes> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(text)?;
    let mut nodes = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| anyhow!("Inventory keys must be strings, got {:?}", key))?
            .to_string();
        // A bare `name:` entry deserializes as null
        let node = if value.is_null() {
            InventoryNode::default()
        } else {
            serde_yaml::from_value(value).with_context(|| format!("Invalid entry {}", name))?
        };
        nodes.push((name, node));
    }
    Ok(nodes)
}

/// Groups a host inherits from, highest priority first. Each group is followed by
/// its own parents; a group reached twice keeps its first (highest) position.
fn group_chain<'a>(
    direct: &'a [String],
    groups: &'a Nodes,
    seen: &mut HashSet<&'a str>,
    chain: &mut Vec<&'a InventoryNode>,
) -> Result<()> {
    for name in direct {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let (_, node) = groups
            .iter()
            .find(|(g, _)| g == name)
            .ok_or_else(|| anyhow!("Unknown group {:?}", name))?;
        chain.push(node);
        group_chain(&node.groups, groups, seen, chain)?;
    }
    Ok(())
}

fn resolve_host(
    name: &str,
    host: &InventoryNode,
    groups: &Nodes,
    defaults: &InventoryNode,
) -> Result<HostEntry> {
    let mut chain: Vec<&InventoryNode> = Vec::new();
    group_chain(&host.groups, groups, &mut HashSet::new(), &mut chain)
        .with_context(|| format!("Host {}", name))?;

    // Highest priority first: host, its groups, then defaults
    let mut layers: Vec<&InventoryNode> = vec![host];
    layers.extend(chain);
    layers.push(defaults);

    let pick = |field: fn(&InventoryNode) -> Option<&String>| -> Option<String> {
        layers.iter().find_map(|node| field(node)).cloned()
    };

    // Data merges per key, so apply layers lowest priority first
    let mut data = serde_yaml::Mapping::new();
    for node in layers.iter().rev() {
        for (key, value) in &node.data {
            data.insert(key.clone(), value.clone());
        }
    }

    Ok(HostEntry {
        name: name.to_string(),
        address: host.hostname.clone().unwrap_or_else(|| name.to_string()),
        platform: pick(|n| n.platform.as_ref()),
        port: layers.iter().find_map(|n| n.port).unwrap_or(DEFAULT_SSH_PORT),
        username: pick(|n| n.username.as_ref()),
        password: pick(|n| n.password.as_ref()),
        data,
    })
}

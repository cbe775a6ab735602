use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PipelineError;

/// Default SSH port for inventory hosts without an explicit `port`
pub const DEFAULT_SSH_PORT: u16 = 22;

/// HostEntry is one inventory host with group/default inheritance already applied
#[derive(Debug, Clone, PartialEq)]
pub struct HostEntry {
    pub name: String,
    /// Management address (`hostname` in the inventory file)
    pub address: String,
    pub platform: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub data: serde_yaml::Mapping,
}

impl HostEntry {
    /// Type the resolved `data` map. Failures belong to this host only.
    pub fn vars(&self) -> Result<HostVars, PipelineError> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(self.data.clone()))
            .map_err(|e| PipelineError::Inventory(format!("{}: {}", self.name, e)))
    }

    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// ISE cluster endpoints and shared RADIUS key rendered into the global templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IseServers {
    pub ise_key: String,
    pub ise_vip_a_name: String,
    pub ise_vip_a_ip: String,
    pub ise_vip_a_psn1: String,
    pub ise_vip_a_psn2: String,
    pub ise_vip_b_name: String,
    pub ise_vip_b_ip: String,
    pub ise_vip_b_psn1: String,
    pub ise_vip_b_psn2: String,
}

/// HostVars are the typed dot1x variables of one host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostVars {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "vlan_list")]
    pub vlans: Vec<String>,
    #[serde(default)]
    pub uplinks: Vec<String>,
    #[serde(default)]
    pub excluded_intf: Vec<String>,
    #[serde(flatten)]
    pub ise: IseServers,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VlanId {
    Number(u64),
    Text(String),
}

/// Accept VLAN ids written as integers or strings; keep first occurrence order
fn vlan_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<VlanId> = Vec::deserialize(deserializer)?;
    let mut vlans: Vec<String> = Vec::with_capacity(raw.len());
    for id in raw {
        let vlan = match id {
            VlanId::Number(n) => n.to_string(),
            VlanId::Text(s) => s.trim().to_string(),
        };
        if !vlans.contains(&vlan) {
            vlans.push(vlan);
        }
    }
    Ok(vlans)
}

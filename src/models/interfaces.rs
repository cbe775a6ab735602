use serde::{Deserialize, Serialize};

/// InterfaceRecord is one parsed entry of `show interfaces switchport`.
/// Absent VLANs serialize as null so templates can test them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub access_vlan: Option<String>,
    #[serde(default)]
    pub admin_mode: String,
    #[serde(default)]
    pub oper_mode: String,
    pub native_vlan: Option<String>,
    pub voice_vlan: Option<String>,
}

impl InterfaceRecord {
    pub fn new(name: impl Into<String>, access_vlan: Option<&str>) -> Self {
        Self {
            name: name.into(),
            access_vlan: access_vlan.map(str::to_string),
            admin_mode: String::new(),
            oper_mode: String::new(),
            native_vlan: None,
            voice_vlan: None,
        }
    }

    /// True when the port's access VLAN is one of `vlans`
    pub fn in_vlans(&self, vlans: &[String]) -> bool {
        match self.access_vlan.as_deref() {
            Some(vlan) => vlans.iter().any(|v| v == vlan),
            None => false,
        }
    }
}

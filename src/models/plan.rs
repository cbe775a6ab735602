use serde::Serialize;

use super::{Dialect, InterfaceRecord, IseServers, Region};

/// Which section of the dot1x config a template produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Global,
    Uplink,
    Access,
}

/// Switch-level facts shared by every template context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchFacts {
    pub hostname: String,
    pub model: String,
    pub ibns_ver: Dialect,
    pub region: Region,
    pub vlans: Vec<String>,
    pub uplinks: Vec<String>,
    pub excluded_intf: Vec<String>,
    #[serde(flatten)]
    pub ise: IseServers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalContext {
    #[serde(flatten)]
    pub switch: SwitchFacts,
    /// `vlans` joined with commas, in inventory order
    pub vlan_list: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UplinkContext {
    #[serde(flatten)]
    pub switch: SwitchFacts,
    pub uplink_interfaces: Vec<InterfaceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessContext {
    #[serde(flatten)]
    pub switch: SwitchFacts,
    pub access_interfaces: Vec<InterfaceRecord>,
}

/// Data handed to one template; serializes to a flat object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TemplateContext {
    Global(GlobalContext),
    Uplink(UplinkContext),
    Access(AccessContext),
}

impl TemplateContext {
    pub fn kind(&self) -> TemplateKind {
        match self {
            TemplateContext::Global(_) => TemplateKind::Global,
            TemplateContext::Uplink(_) => TemplateKind::Uplink,
            TemplateContext::Access(_) => TemplateKind::Access,
        }
    }
}

/// One (template, data) pair of a render plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub template_id: String,
    pub context: TemplateContext,
}

impl PlanEntry {
    pub fn kind(&self) -> TemplateKind {
        self.context.kind()
    }
}

/// RenderPlan lists the templates for one switch, always global, uplink, access
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    pub entries: Vec<PlanEntry>,
}

impl RenderPlan {
    pub fn entry(&self, kind: TemplateKind) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.kind() == kind)
    }

    pub fn template_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.template_id.as_str()).collect()
    }
}

/// Rendered text of each plan section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedConfig {
    pub global: String,
    pub uplink: String,
    pub access: String,
}

impl RenderedConfig {
    /// Global section, a newline, then the interface sections back to back
    pub fn assemble(&self) -> String {
        format!("{}\n{}{}", self.global, self.uplink, self.access)
    }
}

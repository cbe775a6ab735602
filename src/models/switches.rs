use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{InterfaceRecord, IseServers};

/// IBNS command dialect targeted for a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "v1")]
    IbnsV1,
    #[serde(rename = "v2")]
    IbnsV2,
}

impl Dialect {
    /// Version suffix used in template file names ("v1"/"v2")
    pub fn version(&self) -> &'static str {
        match self {
            Dialect::IbnsV1 => "v1",
            Dialect::IbnsV2 => "v2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IBNS{}", self.version())
    }
}

/// ISE region a switch authenticates against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    East,
    West,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::East => "east",
            Region::West => "west",
        }
    }

    /// Exact, lowercase match only
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "east" => Some(Region::East),
            "west" => Some(Region::West),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interfaces partitioned by role. Each group keeps inventory order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSets {
    pub uplinks: Vec<InterfaceRecord>,
    pub access: Vec<InterfaceRecord>,
    /// Informational only; never rendered
    pub excluded: Vec<InterfaceRecord>,
}

impl RoleSets {
    pub fn counts(&self, total: usize) -> RoleCounts {
        let classified = self.uplinks.len() + self.access.len() + self.excluded.len();
        RoleCounts {
            uplinks: self.uplinks.len(),
            access: self.access.len(),
            excluded: self.excluded.len(),
            unmatched: total.saturating_sub(classified),
        }
    }
}

/// Per-role interface counts reported in the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub uplinks: usize,
    pub access: usize,
    pub excluded: usize,
    /// Interfaces outside the target VLANs (IBNS v2 only)
    pub unmatched: usize,
}

/// Per-switch input bundle, owned by exactly one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchContext {
    pub host: String,
    pub model: String,
    pub dialect: Option<Dialect>,
    pub interfaces: Vec<InterfaceRecord>,
    pub vlans: Vec<String>,
    pub uplink_names: BTreeSet<String>,
    pub excluded_names: BTreeSet<String>,
    pub region: Option<String>,
    pub ise: IseServers,
}

impl SwitchContext {
    /// Stage the selected dialect, consuming the inventoried context
    pub fn with_dialect(self, dialect: Dialect) -> Self {
        Self {
            dialect: Some(dialect),
            ..self
        }
    }
}

/// A switch context after dialect selection and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSwitch {
    pub context: SwitchContext,
    pub roles: RoleSets,
}

impl ClassifiedSwitch {
    pub fn counts(&self) -> RoleCounts {
        self.roles.counts(self.context.interfaces.len())
    }
}

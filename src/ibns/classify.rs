use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::models::{ClassifiedSwitch, Dialect, InterfaceRecord, RoleSets, SwitchContext};

use super::select_dialect;

/// Partition interfaces into uplink, access and excluded groups.
///
/// Checks run in this order for every interface:
/// 1. name in `uplink_names` -> uplink (wins over exclusion and VLAN filtering)
/// 2. name in `excluded_names` -> excluded
/// 3. IBNS v1: access. IBNS v2: access only when the access VLAN is one of
///    `target_vlans`, otherwise the interface is left out of every group.
///
/// Groups keep input order.
pub fn classify(
    interfaces: &[InterfaceRecord],
    uplink_names: &BTreeSet<String>,
    excluded_names: &BTreeSet<String>,
    target_vlans: &[String],
    dialect: Dialect,
) -> RoleSets {
    let mut roles = RoleSets::default();

    for intf in interfaces {
        if uplink_names.contains(&intf.name) {
            roles.uplinks.push(intf.clone());
        } else if excluded_names.contains(&intf.name) {
            roles.excluded.push(intf.clone());
        } else {
            match dialect {
                Dialect::IbnsV1 => roles.access.push(intf.clone()),
                Dialect::IbnsV2 if intf.in_vlans(target_vlans) => roles.access.push(intf.clone()),
                Dialect::IbnsV2 => {}
            }
        }
    }

    roles
}

/// Select the dialect from the model and classify the switch's interfaces
pub fn classify_switch(ctx: SwitchContext) -> Result<ClassifiedSwitch, PipelineError> {
    if ctx.interfaces.is_empty() {
        return Err(PipelineError::EmptyInterfaceInventory { host: ctx.host });
    }

    let dialect = select_dialect(&ctx.model);
    let ctx = ctx.with_dialect(dialect);
    let roles = classify(
        &ctx.interfaces,
        &ctx.uplink_names,
        &ctx.excluded_names,
        &ctx.vlans,
        dialect,
    );

    Ok(ClassifiedSwitch { context: ctx, roles })
}

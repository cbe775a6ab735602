use crate::error::PipelineError;
use crate::models::*;

/// Template file for a (kind, dialect, region) triple.
///
/// Global templates vary by dialect and region, the uplink template is shared by
/// both dialects, access templates vary by dialect only.
pub fn template_id(kind: TemplateKind, dialect: Dialect, region: Region) -> String {
    match kind {
        TemplateKind::Global => format!("IBNS{}_{}_global.j2", dialect.version(), region.as_str()),
        TemplateKind::Uplink => "IBNS_uplink_intf.j2".to_string(),
        TemplateKind::Access => format!("IBNS{}_access_intf.j2", dialect.version()),
    }
}

/// Build the global, uplink and access template selections for a classified switch.
///
/// A missing dialect or a missing/unknown region is a configuration error for this
/// switch; neither is defaulted here.
pub fn build_plan(switch: &ClassifiedSwitch) -> Result<RenderPlan, PipelineError> {
    let ctx = &switch.context;

    let dialect = ctx
        .dialect
        .ok_or_else(|| PipelineError::unrecognized("dialect", ""))?;
    let region = match ctx.region.as_deref() {
        Some(value) => Region::parse(value).ok_or_else(|| PipelineError::unrecognized("region", value))?,
        None => return Err(PipelineError::unrecognized("region", "")),
    };

    let facts = SwitchFacts {
        hostname: ctx.host.clone(),
        model: ctx.model.clone(),
        ibns_ver: dialect,
        region,
        vlans: ctx.vlans.clone(),
        uplinks: ctx.uplink_names.iter().cloned().collect(),
        excluded_intf: ctx.excluded_names.iter().cloned().collect(),
        ise: ctx.ise.clone(),
    };

    let entries = vec![
        PlanEntry {
            template_id: template_id(TemplateKind::Global, dialect, region),
            context: TemplateContext::Global(GlobalContext {
                switch: facts.clone(),
                vlan_list: ctx.vlans.join(","),
            }),
        },
        PlanEntry {
            template_id: template_id(TemplateKind::Uplink, dialect, region),
            context: TemplateContext::Uplink(UplinkContext {
                switch: facts.clone(),
                uplink_interfaces: switch.roles.uplinks.clone(),
            }),
        },
        PlanEntry {
            template_id: template_id(TemplateKind::Access, dialect, region),
            context: TemplateContext::Access(AccessContext {
                switch: facts,
                access_interfaces: switch.roles.access.clone(),
            }),
        },
    ];

    Ok(RenderPlan { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ibns::classify_switch;
    use std::collections::BTreeSet;

    fn classified(model: &str, region: Option<&str>) -> ClassifiedSwitch {
        let ctx = SwitchContext {
            host: "sw1".to_string(),
            model: model.to_string(),
            dialect: None,
            interfaces: vec![
                InterfaceRecord::new("Gi1/0/1", Some("10")),
                InterfaceRecord::new("Gi1/0/2", Some("20")),
                InterfaceRecord::new("Te1/1/1", None),
            ],
            vlans: vec!["10".to_string(), "30".to_string()],
            uplink_names: BTreeSet::from(["Te1/1/1".to_string()]),
            excluded_names: BTreeSet::new(),
            region: region.map(str::to_string),
            ise: IseServers {
                ise_key: "secret".to_string(),
                ..IseServers::default()
            },
        };
        classify_switch(ctx).unwrap()
    }

    #[test]
    fn test_template_ids() {
        use Dialect::*;
        use Region::*;

        assert_eq!(template_id(TemplateKind::Global, IbnsV1, East), "IBNSv1_east_global.j2");
        assert_eq!(template_id(TemplateKind::Global, IbnsV2, West), "IBNSv2_west_global.j2");
        assert_ne!(
            template_id(TemplateKind::Global, IbnsV2, East),
            template_id(TemplateKind::Global, IbnsV2, West)
        );
        assert_eq!(
            template_id(TemplateKind::Uplink, IbnsV1, East),
            template_id(TemplateKind::Uplink, IbnsV2, West)
        );
        assert_eq!(template_id(TemplateKind::Access, IbnsV1, West), "IBNSv1_access_intf.j2");
        assert_eq!(template_id(TemplateKind::Access, IbnsV2, West), "IBNSv2_access_intf.j2");
    }

    #[test]
    fn test_plan_order_and_ids() {
        let plan = build_plan(&classified("C9300", Some("west"))).unwrap();
        assert_eq!(
            plan.template_ids(),
            vec!["IBNSv2_west_global.j2", "IBNS_uplink_intf.j2", "IBNSv2_access_intf.j2"]
        );
        let kinds: Vec<TemplateKind> = plan.entries.iter().map(PlanEntry::kind).collect();
        assert_eq!(kinds, vec![TemplateKind::Global, TemplateKind::Uplink, TemplateKind::Access]);
    }

    #[test]
    fn test_contexts_carry_role_subsets() {
        let plan = build_plan(&classified("C9300", Some("east"))).unwrap();

        match &plan.entry(TemplateKind::Global).unwrap().context {
            TemplateContext::Global(g) => {
                assert_eq!(g.vlan_list, "10,30");
                assert_eq!(g.switch.ise.ise_key, "secret");
                assert_eq!(g.switch.region, Region::East);
            }
            other => panic!("unexpected context {:?}", other),
        }
        match &plan.entry(TemplateKind::Uplink).unwrap().context {
            TemplateContext::Uplink(u) => {
                let names: Vec<&str> = u.uplink_interfaces.iter().map(|i| i.name.as_str()).collect();
                assert_eq!(names, vec!["Te1/1/1"]);
            }
            other => panic!("unexpected context {:?}", other),
        }
        match &plan.entry(TemplateKind::Access).unwrap().context {
            TemplateContext::Access(a) => {
                let names: Vec<&str> = a.access_interfaces.iter().map(|i| i.name.as_str()).collect();
                assert_eq!(names, vec!["Gi1/0/1"]);
            }
            other => panic!("unexpected context {:?}", other),
        }
    }

    #[test]
    fn test_context_serializes_flat() {
        let plan = build_plan(&classified("C3750X", Some("east"))).unwrap();
        let value = serde_json::to_value(&plan.entry(TemplateKind::Global).unwrap().context).unwrap();
        assert_eq!(value["ibns_ver"], "v1");
        assert_eq!(value["region"], "east");
        assert_eq!(value["ise_key"], "secret");
        assert_eq!(value["vlan_list"], "10,30");
        assert_eq!(value["uplinks"], serde_json::json!(["Te1/1/1"]));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let switch = classified("C3750X", Some("east"));
        assert_eq!(build_plan(&switch).unwrap(), build_plan(&switch).unwrap());
    }

    #[test]
    fn test_missing_region_is_fatal() {
        assert_eq!(
            build_plan(&classified("C9300", None)),
            Err(PipelineError::unrecognized("region", ""))
        );
    }

    #[test]
    fn test_unknown_region_is_fatal() {
        assert_eq!(
            build_plan(&classified("C9300", Some("East"))),
            Err(PipelineError::unrecognized("region", "East"))
        );
    }

    #[test]
    fn test_missing_dialect_is_fatal() {
        let mut switch = classified("C9300", Some("east"));
        switch.context.dialect = None;
        assert_eq!(build_plan(&switch), Err(PipelineError::unrecognized("dialect", "")));
    }
}

use crate::models::Dialect;

/// Model-family token of the only hardware that still needs IBNS v1
const LEGACY_FAMILY: &str = "3750";

/// Map a hardware model token to its IBNS dialect.
///
/// Catalyst 3750 models get IBNS v1. Every other model, including ones this tool
/// has never seen, gets IBNS v2. Matching is a case-sensitive substring test on
/// the token as the device reported it.
pub fn select_dialect(model: &str) -> Dialect {
    if model.contains(LEGACY_FAMILY) {
        Dialect::IbnsV1
    } else {
        Dialect::IbnsV2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_3750_family_is_v1() {
        for model in ["C3750X", "WS-C3750X", "C3750", "C3750E", "3750", "C3750V2"] {
            assert_eq!(select_dialect(model), Dialect::IbnsV1, "{}", model);
        }
    }

    #[test]
    fn test_other_models_are_v2() {
        for model in ["C9300", "WS-C9300", "C3850", "C2960X", "C375", "C37-50", "unknown"] {
            assert_eq!(select_dialect(model), Dialect::IbnsV2, "{}", model);
        }
    }
}

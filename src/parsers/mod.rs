//! Parsers for Catalyst IOS show-command output.

use regex_lite::Regex;

use crate::models::InterfaceRecord;

/// Extract the hardware identifier (e.g. "WS-C3750X-48P-S") from `show version`.
/// Prefers the "Model number" line, falls back to the "cisco <id> (...)" banner.
pub fn parse_hardware(show_version: &str) -> Option<String> {
    let patterns = [
        r"(?m)^\s*Model [Nn]umber\s*:\s*(\S+)",
        r"(?m)^\s*cisco\s+(\S+)\s+\(",
    ];
    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(caps) = re.captures(show_version) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Model-family token of a hardware identifier, case preserved:
/// "WS-C3750X-48P-S" -> "C3750X", "C9300-48P" -> "C9300"
pub fn model_token(hardware: &str) -> Option<String> {
    let trimmed = hardware.trim();
    let without_prefix = trimmed.strip_prefix("WS-").unwrap_or(trimmed);
    without_prefix
        .split('-')
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Leading numeric VLAN id of a value like "10 (VLAN0010)"; None for "none"
fn vlan_id(re: &Regex, value: &str) -> Option<String> {
    re.captures(value.trim()).map(|caps| caps[1].to_string())
}

/// Parse `show interfaces switchport` into one record per "Name:" block
pub fn parse_switchport(output: &str) -> Vec<InterfaceRecord> {
    let mut records: Vec<InterfaceRecord> = Vec::new();
    let Ok(vlan_re) = Regex::new(r"^(\d+)") else {
        return records;
    };

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();

        if key == "Name" {
            if !value.is_empty() {
                records.push(InterfaceRecord::new(value, None));
            }
            continue;
        }

        let Some(current) = records.last_mut() else {
            continue;
        };
        match key {
            "Administrative Mode" => current.admin_mode = value.to_string(),
            "Operational Mode" => current.oper_mode = value.to_string(),
            "Access Mode VLAN" => current.access_vlan = vlan_id(&vlan_re, value),
            "Trunking Native Mode VLAN" => current.native_vlan = vlan_id(&vlan_re, value),
            "Voice VLAN" => current.voice_vlan = vlan_id(&vlan_re, value),
            _ => {}
        }
    }

    records
}

/// Sysauthcontrol state ("Enabled"/"Disabled") from `show dot1x all`
pub fn parse_sysauthcontrol(output: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*Sysauthcontrol\s+(\S+)").ok()?;
    re.captures(output).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_VERSION_3750: &str = "\
Cisco IOS Software, C3750E Software (C3750E-UNIVERSALK9-M), Version 15.0(2)SE11
cisco WS-C3750X-48P (PowerPC405) processor (revision A0) with 262144K bytes of memory.
Processor board ID FDO1234X5YZ
Base ethernet MAC Address       : 00:11:22:33:44:55
Model number                    : WS-C3750X-48P-S
System serial number            : FDO1234X5YZ
";

    const SHOW_VERSION_9300: &str = "\
Cisco IOS XE Software, Version 17.03.04
cisco C9300-48P (X86) processor with 1419044K/6147K bytes of memory.
";

    const SWITCHPORT: &str = "\
Name: Gi1/0/1
Switchport: Enabled
Administrative Mode: static access
Operational Mode: static access
Access Mode VLAN: 10 (VLAN0010)
Trunking Native Mode VLAN: 1 (default)
Voice VLAN: 110 (VOICE)

Name: Gi1/0/2
Switchport: Enabled
Administrative Mode: dynamic auto
Operational Mode: down
Access Mode VLAN: 20 (VLAN0020)
Trunking Native Mode VLAN: 1 (default)
Voice VLAN: none

Name: Te1/1/1
Switchport: Enabled
Administrative Mode: trunk
Operational Mode: trunk
Access Mode VLAN: 1 (default)
Trunking Native Mode VLAN: 999 (NATIVE)
Voice VLAN: none
";

    #[test]
    fn test_parse_hardware_model_number_line() {
        assert_eq!(parse_hardware(SHOW_VERSION_3750).as_deref(), Some("WS-C3750X-48P-S"));
    }

    #[test]
    fn test_parse_hardware_banner_fallback() {
        assert_eq!(parse_hardware(SHOW_VERSION_9300).as_deref(), Some("C9300-48P"));
        assert_eq!(parse_hardware("% Invalid input"), None);
    }

    #[test]
    fn test_model_token() {
        assert_eq!(model_token("WS-C3750X-48P-S").as_deref(), Some("C3750X"));
        assert_eq!(model_token("C9300-48P").as_deref(), Some("C9300"));
        assert_eq!(model_token("C3850").as_deref(), Some("C3850"));
        assert_eq!(model_token("ws-c3750x").as_deref(), Some("ws"));
        assert_eq!(model_token("-48P"), None);
    }

    #[test]
    fn test_parse_switchport() {
        let records = parse_switchport(SWITCHPORT);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "Gi1/0/1");
        assert_eq!(records[0].access_vlan.as_deref(), Some("10"));
        assert_eq!(records[0].voice_vlan.as_deref(), Some("110"));
        assert_eq!(records[0].admin_mode, "static access");

        assert_eq!(records[1].name, "Gi1/0/2");
        assert_eq!(records[1].access_vlan.as_deref(), Some("20"));
        assert_eq!(records[1].voice_vlan, None);

        assert_eq!(records[2].admin_mode, "trunk");
        assert_eq!(records[2].native_vlan.as_deref(), Some("999"));
    }

    #[test]
    fn test_parse_switchport_full_stack() {
        let mut output = String::new();
        for port in 1..=48 {
            output.push_str(&format!(
                "Name: Gi1/0/{}\nAccess Mode VLAN: {} (VLAN{:04})\nVoice VLAN: none\n\n",
                port,
                100 + port,
                100 + port
            ));
        }

        let records = parse_switchport(&output);
        assert_eq!(records.len(), 48);
        assert_eq!(records[0].access_vlan.as_deref(), Some("101"));
        assert_eq!(records[47].name, "Gi1/0/48");
        assert_eq!(records[47].access_vlan.as_deref(), Some("148"));
        assert!(records.iter().all(|r| r.voice_vlan.is_none()));
    }

    #[test]
    fn test_parse_switchport_empty() {
        assert!(parse_switchport("").is_empty());
        assert!(parse_switchport("Switchport: Enabled\n").is_empty());
    }

    #[test]
    fn test_parse_sysauthcontrol() {
        let output = "\
Sysauthcontrol              Enabled
Dot1x Protocol Version            3
";
        assert_eq!(parse_sysauthcontrol(output).as_deref(), Some("Enabled"));
        assert_eq!(parse_sysauthcontrol("Sysauthcontrol Disabled").as_deref(), Some("Disabled"));
        assert_eq!(parse_sysauthcontrol("nothing here"), None);
    }
}

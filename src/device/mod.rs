//! Switch collaborators: everything that talks to a device.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::models::{HostEntry, InterfaceRecord};
use crate::parsers;
use crate::utils::{self, SshTarget};

/// Parsed `show dot1x all` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot1xStatus {
    /// Sysauthcontrol value, e.g. "Enabled"
    pub status: String,
    pub raw: String,
}

/// Operations the pipeline needs from one switch
#[async_trait]
pub trait SwitchDevice: Send + Sync {
    /// Model-family token from the hardware identifier (e.g. "C3750X")
    async fn device_model(&self) -> Result<String>;

    /// Parsed switchport state of every interface
    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>>;

    /// Push configuration text; returns the device transcript
    async fn push_config(&self, config: &str) -> Result<String>;

    async fn dot1x_status(&self) -> Result<Dot1xStatus>;

    /// Persist the running config
    async fn save_config(&self) -> Result<String>;
}

/// Opens a [`SwitchDevice`] for an inventory host
pub trait DeviceConnector: Send + Sync {
    fn connect(&self, host: &HostEntry) -> Result<Box<dyn SwitchDevice>>;
}

/// Run-wide fallback login used when the inventory has none for a host
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// DeviceConnector backed by SSH (libssh2)
pub struct SshConnector {
    fallback: Credentials,
    timeout_secs: u64,
}

impl SshConnector {
    pub fn new(fallback: Credentials, timeout_secs: u64) -> Self {
        Self {
            fallback,
            timeout_secs,
        }
    }
}

impl DeviceConnector for SshConnector {
    fn connect(&self, host: &HostEntry) -> Result<Box<dyn SwitchDevice>> {
        // Inventory credentials win, the run-wide login fills the gaps
        let user = host
            .username
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.fallback.username.clone());
        let pass = host
            .password
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.fallback.password.clone());

        if user.is_empty() || pass.is_empty() {
            return Err(anyhow!("No SSH credentials available for {}", host.name));
        }

        Ok(Box::new(SshSwitch {
            target: SshTarget {
                host: host.address.clone(),
                port: host.port,
                user,
                pass,
                timeout_secs: self.timeout_secs,
            },
        }))
    }
}

/// Catalyst IOS switch reached over SSH. Every call opens its own session.
pub struct SshSwitch {
    target: SshTarget,
}

#[async_trait]
impl SwitchDevice for SshSwitch {
    async fn device_model(&self) -> Result<String> {
        let output = utils::ssh_run_command_async(&self.target, "show version")
            .await
            .context("show version failed")?;
        let hardware = parsers::parse_hardware(&output)
            .ok_or_else(|| anyhow!("No hardware identifier in show version output"))?;
        parsers::model_token(&hardware)
            .ok_or_else(|| anyhow!("Unrecognized hardware identifier {:?}", hardware))
    }

    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>> {
        let output = utils::ssh_run_command_async(&self.target, "show interfaces switchport")
            .await
            .context("show interfaces switchport failed")?;
        Ok(parsers::parse_switchport(&output))
    }

    async fn push_config(&self, config: &str) -> Result<String> {
        let mut lines = vec!["configure terminal".to_string()];
        lines.extend(
            config
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string),
        );
        lines.push("end".to_string());

        utils::ssh_run_interactive_async(&self.target, lines)
            .await
            .context("Config push failed")
    }

    async fn dot1x_status(&self) -> Result<Dot1xStatus> {
        let raw = utils::ssh_run_command_async(&self.target, "show dot1x all")
            .await
            .context("show dot1x all failed")?;
        let status = parsers::parse_sysauthcontrol(&raw)
            .ok_or_else(|| anyhow!("No Sysauthcontrol line in show dot1x all output"))?;
        Ok(Dot1xStatus { status, raw })
    }

    async fn save_config(&self) -> Result<String> {
        utils::ssh_run_command_async(&self.target, "write memory")
            .await
            .context("write memory failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_SSH_PORT;

    fn host(username: Option<&str>, password: Option<&str>) -> HostEntry {
        HostEntry {
            name: "sw1".to_string(),
            address: "10.0.0.1".to_string(),
            platform: Some("cisco_ios".to_string()),
            port: DEFAULT_SSH_PORT,
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            data: serde_yaml::Mapping::new(),
        }
    }

    #[test]
    fn test_connect_requires_credentials() {
        let connector = SshConnector::new(Credentials::default(), 5);
        assert!(connector.connect(&host(None, None)).is_err());
        assert!(connector.connect(&host(Some("admin"), None)).is_err());
        assert!(connector.connect(&host(Some("admin"), Some("pw"))).is_ok());
    }

    #[test]
    fn test_connect_uses_fallback_credentials() {
        let fallback = Credentials {
            username: "netops".to_string(),
            password: "pw".to_string(),
        };
        assert!(fallback.is_complete());
        let connector = SshConnector::new(fallback, 5);
        assert!(connector.connect(&host(None, Some(""))).is_ok());
    }
}

use std::env;
use std::path::PathBuf;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub inventory_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub configs_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_workers: usize,
    pub ssh_timeout_secs: u64,
    pub ssh_user: String,
    pub ssh_pass: String,
    pub platform_filter: String,
    pub expected_dot1x_status: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            inventory_dir: get_env("INVENTORY_DIR", "./inventory").into(),
            templates_dir: get_env("TEMPLATES_DIR", "./templates").into(),
            configs_dir: get_env("CONFIGS_DIR", "./configs").into(),
            output_dir: get_env("OUTPUT_DIR", "./output").into(),
            max_workers: get_env("MAX_WORKERS", "8").parse().unwrap_or(8),
            ssh_timeout_secs: get_env("SSH_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            ssh_user: get_env("SSH_USER", ""),
            ssh_pass: get_env("SSH_PASS", ""),
            platform_filter: get_env("PLATFORM_FILTER", "cisco_ios"),
            expected_dot1x_status: get_env("EXPECTED_DOT1X_STATUS", "Enabled"),
        }
        .normalized()
    }

    /// Clamp values that would stall the run
    pub fn normalized(mut self) -> Self {
        self.max_workers = self.max_workers.max(1);
        self.ssh_timeout_secs = self.ssh_timeout_secs.max(1);
        self
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_default() {
        assert_eq!(get_env("DOT1X_APPLIER_TEST_UNSET_KEY", "fallback"), "fallback");
    }

    #[test]
    fn test_normalized_clamps_workers() {
        let mut cfg = Config::load();
        cfg.max_workers = 0;
        cfg.ssh_timeout_secs = 0;
        let cfg = cfg.normalized();
        assert_eq!(cfg.max_workers, 1);
        assert_eq!(cfg.ssh_timeout_secs, 1);
    }
}

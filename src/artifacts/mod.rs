use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use crate::utils::{dot1x_config_filename, dot1x_verified_filename, is_valid_hostname};

/// Writes per-switch text artifacts: rendered configs and dot1x verification output
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    configs_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(configs_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            configs_dir: configs_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Save the assembled config as `<configs_dir>/<host>_dot1x.txt`
    pub async fn write_config(&self, host: &str, config: &str) -> Result<PathBuf> {
        write_artifact(&self.configs_dir, host, &dot1x_config_filename(host), config).await
    }

    /// Save raw `show dot1x all` output as `<output_dir>/<host>_dot1x_verified.txt`
    pub async fn write_verification(&self, host: &str, output: &str) -> Result<PathBuf> {
        write_artifact(&self.output_dir, host, &dot1x_verified_filename(host), output).await
    }
}

async fn write_artifact(dir: &Path, host: &str, filename: &str, content: &str) -> Result<PathBuf> {
    // Host names become file names
    if !is_valid_hostname(host) {
        return Err(anyhow!("Refusing to write artifact for invalid host name {:?}", host));
    }

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(filename);
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dot1x-artifacts-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_write_config_and_verification() {
        let root = scratch_dir("write");
        let writer = ArtifactWriter::new(root.join("configs"), root.join("output"));

        let config_path = writer.write_config("idf1-sw1", "dot1x system-auth-control\n").await.unwrap();
        assert_eq!(config_path, root.join("configs").join("idf1-sw1_dot1x.txt"));
        assert_eq!(
            tokio::fs::read_to_string(&config_path).await.unwrap(),
            "dot1x system-auth-control\n"
        );

        let verify_path = writer.write_verification("idf1-sw1", "Sysauthcontrol Enabled").await.unwrap();
        assert_eq!(verify_path, root.join("output").join("idf1-sw1_dot1x_verified.txt"));

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_host() {
        let root = scratch_dir("reject");
        let writer = ArtifactWriter::new(root.join("configs"), root.join("output"));
        assert!(writer.write_config("../escape", "x").await.is_err());
        assert!(!root.exists());
    }
}

//! Per-switch dot1x pipeline:
//! Inventoried → Classified → Planned → Rendered → Applied → Verified → Saved.
//!
//! Switches run concurrently up to `max_workers`; a failure ends only that
//! switch's pipeline. Verification is advisory and never fails a switch.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::artifacts::ArtifactWriter;
use crate::device::{DeviceConnector, SwitchDevice};
use crate::error::PipelineError;
use crate::ibns;
use crate::models::*;
use crate::render::{self, ConfigRenderer};

/// Why a switch stopped, and where
#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: PipelineError,
}

impl StageFailure {
    fn reason(&self) -> String {
        match &self.error {
            PipelineError::ExternalStageFailure { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn fail(stage: Stage) -> impl FnOnce(PipelineError) -> StageFailure {
    move |error| StageFailure { stage, error }
}

fn external(stage: Stage) -> impl FnOnce(anyhow::Error) -> StageFailure {
    move |err| StageFailure {
        stage,
        error: PipelineError::external(stage, err),
    }
}

/// What a switch got through before it finished, for the report
#[derive(Debug, Default)]
struct Progress {
    dialect: Option<Dialect>,
    counts: Option<RoleCounts>,
    verification: Option<Verification>,
}

/// Pipeline drives every inventory host through the dot1x rollout
pub struct Pipeline {
    connector: Arc<dyn DeviceConnector>,
    renderer: Arc<dyn ConfigRenderer>,
    artifacts: Option<ArtifactWriter>,
    expected_status: String,
    max_workers: usize,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        connector: Arc<dyn DeviceConnector>,
        renderer: Arc<dyn ConfigRenderer>,
        max_workers: usize,
        expected_status: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            renderer,
            artifacts: None,
            expected_status: expected_status.into(),
            max_workers: max_workers.max(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_artifacts(mut self, artifacts: ArtifactWriter) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Cancelling this token stops every switch before its next stage
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run all hosts and collect one report per host, in inventory order.
    /// A free worker picks up the next host as soon as any switch finishes.
    pub async fn run(&self, hosts: Vec<HostEntry>) -> RunSummary {
        let run_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            "Starting dot1x run {} for {} switches ({} workers)",
            run_id,
            hosts.len(),
            self.max_workers
        );

        let mut indexed: Vec<(usize, SwitchReport)> = stream::iter(hosts.into_iter().enumerate())
            .map(|(index, host)| async move {
                let span = tracing::info_span!("switch", host = %host.name);
                (index, self.run_switch(host).instrument(span).await)
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        let reports = indexed.into_iter().map(|(_, report)| report).collect();

        let summary = RunSummary { run_id, reports };
        tracing::info!(
            "Run {} finished: {} completed, {} failed, {} verification warnings",
            summary.run_id,
            summary.completed(),
            summary.failed(),
            summary.warnings()
        );
        summary
    }

    async fn run_switch(&self, host: HostEntry) -> SwitchReport {
        let started_at = Utc::now();
        let mut progress = Progress::default();

        let outcome = match self.drive(&host, &mut progress).await {
            Ok(()) => {
                tracing::info!("dot1x rollout completed");
                SwitchOutcome::Completed
            }
            Err(failure) => {
                let reason = failure.reason();
                tracing::error!("Failed at {} stage: {}", failure.stage, reason);
                SwitchOutcome::Failed {
                    stage: failure.stage,
                    reason,
                }
            }
        };

        SwitchReport {
            host: host.name,
            dialect: progress.dialect,
            counts: progress.counts,
            outcome,
            verification: progress.verification,
            started_at,
            completed_at: Utc::now(),
        }
    }

    /// Refuse to start a stage once the run is cancelled
    fn enter(&self, stage: Stage) -> Result<(), StageFailure> {
        if self.cancel.is_cancelled() {
            return Err(StageFailure {
                stage,
                error: PipelineError::Cancelled { stage },
            });
        }
        tracing::debug!("Entering {} stage", stage);
        Ok(())
    }

    async fn drive(&self, host: &HostEntry, progress: &mut Progress) -> Result<(), StageFailure> {
        self.enter(Stage::Inventoried)?;
        let vars = host.vars().map_err(fail(Stage::Inventoried))?;
        let device = self
            .connector
            .connect(host)
            .map_err(external(Stage::Inventoried))?;
        let model = device
            .device_model()
            .await
            .map_err(external(Stage::Inventoried))?;
        let interfaces = device
            .interfaces()
            .await
            .map_err(external(Stage::Inventoried))?;
        tracing::info!("Model {} with {} interfaces", model, interfaces.len());

        let ctx = SwitchContext {
            host: host.name.clone(),
            model,
            dialect: None,
            interfaces,
            vlans: vars.vlans,
            uplink_names: vars.uplinks.into_iter().collect(),
            excluded_names: vars.excluded_intf.into_iter().collect(),
            region: vars.region,
            ise: vars.ise,
        };

        self.enter(Stage::Classified)?;
        let switch = ibns::classify_switch(ctx).map_err(fail(Stage::Classified))?;
        let counts = switch.counts();
        progress.dialect = switch.context.dialect;
        progress.counts = Some(counts);
        tracing::info!(
            "{} detected: {} uplink, {} access, {} excluded, {} outside target VLANs",
            switch.context.dialect.map(|d| d.to_string()).unwrap_or_default(),
            counts.uplinks,
            counts.access,
            counts.excluded,
            counts.unmatched
        );

        self.enter(Stage::Planned)?;
        let plan = ibns::build_plan(&switch).map_err(fail(Stage::Planned))?;
        tracing::debug!("Render plan: {:?}", plan.template_ids());

        self.enter(Stage::Rendered)?;
        let config = render::render_plan(self.renderer.as_ref(), &plan)
            .map_err(external(Stage::Rendered))?
            .assemble();
        if let Some(artifacts) = &self.artifacts {
            artifacts
                .write_config(&host.name, &config)
                .await
                .map_err(external(Stage::Rendered))?;
        }

        self.enter(Stage::Applied)?;
        device
            .push_config(&config)
            .await
            .map_err(external(Stage::Applied))?;
        tracing::info!("dot1x configuration applied");

        self.enter(Stage::Verified)?;
        progress.verification = Some(self.verify(&host.name, device.as_ref()).await);

        self.enter(Stage::Saved)?;
        device
            .save_config()
            .await
            .map_err(external(Stage::Saved))?;
        tracing::info!("Configuration saved");

        Ok(())
    }

    async fn verify(&self, host: &str, device: &dyn SwitchDevice) -> Verification {
        let status = match device.dot1x_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Could not verify dot1x: {:#}", e);
                return Verification::Unavailable {
                    reason: format!("{:#}", e),
                };
            }
        };

        if let Some(artifacts) = &self.artifacts {
            if let Err(e) = artifacts.write_verification(host, &status.raw).await {
                tracing::warn!("Failed to write verification output: {:#}", e);
            }
        }

        let verification = Verification::check(&self.expected_status, &status.status);
        if verification.is_warning() {
            tracing::warn!("{}", verification.describe());
        } else {
            tracing::info!("{}", verification.describe());
        }
        verification
    }
}

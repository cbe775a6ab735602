use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::{Dialect, RoleCounts};

/// Pipeline stages in execution order. A switch that fails is reported against the
/// stage it was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Inventoried,
    Classified,
    Planned,
    Rendered,
    Applied,
    Verified,
    Saved,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Inventoried => "Inventoried",
            Stage::Classified => "Classified",
            Stage::Planned => "Planned",
            Stage::Rendered => "Rendered",
            Stage::Applied => "Applied",
            Stage::Verified => "Verified",
            Stage::Saved => "Saved",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one switch's pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SwitchOutcome {
    Completed,
    Failed { stage: Stage, reason: String },
}

/// Advisory result of the post-apply dot1x check. Never affects the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verification {
    Confirmed { status: String },
    Mismatch { expected: String, actual: String },
    Unavailable { reason: String },
}

impl Verification {
    /// Compare the device-reported Sysauthcontrol status with the expected one
    pub fn check(expected: &str, actual: &str) -> Self {
        if actual.trim().eq_ignore_ascii_case(expected.trim()) {
            Verification::Confirmed {
                status: actual.trim().to_string(),
            }
        } else {
            Verification::Mismatch {
                expected: expected.to_string(),
                actual: actual.trim().to_string(),
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        !matches!(self, Verification::Confirmed { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Verification::Confirmed { status } => format!("dot1x {}", status),
            Verification::Mismatch { expected, actual } => {
                format!("dot1x status {:?}, expected {:?}", actual, expected)
            }
            Verification::Unavailable { reason } => format!("dot1x status unavailable: {}", reason),
        }
    }
}

/// SwitchReport is the final record for one switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchReport {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<RoleCounts>,
    pub outcome: SwitchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SwitchReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, SwitchOutcome::Completed)
    }

    pub fn has_warning(&self) -> bool {
        self.verification.as_ref().is_some_and(Verification::is_warning)
    }

    /// Status column of the summary table
    pub fn status_label(&self) -> String {
        match &self.outcome {
            SwitchOutcome::Completed if self.has_warning() => "Completed (verification warning)".to_string(),
            SwitchOutcome::Completed => "Completed".to_string(),
            SwitchOutcome::Failed { stage, .. } => format!("Failed({})", stage),
        }
    }

    fn detail(&self) -> String {
        match (&self.outcome, &self.verification) {
            (SwitchOutcome::Failed { reason, .. }, _) => reason.clone(),
            (SwitchOutcome::Completed, Some(v)) => v.describe(),
            (SwitchOutcome::Completed, None) => String::new(),
        }
    }
}

/// RunSummary aggregates the terminal state of every switch in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub reports: Vec<SwitchReport>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.completed()
    }

    /// Failure counts keyed by the stage each switch failed at
    pub fn failed_by_stage(&self) -> BTreeMap<Stage, usize> {
        let mut counts = BTreeMap::new();
        for report in &self.reports {
            if let SwitchOutcome::Failed { stage, .. } = report.outcome {
                *counts.entry(stage).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn warnings(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.is_completed() && r.has_warning())
            .count()
    }

    /// True when no switch failed; verification warnings are allowed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host_width = self
            .reports
            .iter()
            .map(|r| r.host.len())
            .max()
            .unwrap_or(0)
            .max("HOST".len());
        let status_width = self
            .reports
            .iter()
            .map(|r| r.status_label().len())
            .max()
            .unwrap_or(0)
            .max("STATUS".len());

        writeln!(
            f,
            "{:<hw$}  {:<7}  {:<sw$}  DETAIL",
            "HOST",
            "DIALECT",
            "STATUS",
            hw = host_width,
            sw = status_width
        )?;
        for report in &self.reports {
            let dialect = report.dialect.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<hw$}  {:<7}  {:<sw$}  {}",
                report.host,
                dialect,
                report.status_label(),
                report.detail(),
                hw = host_width,
                sw = status_width
            )?;
        }

        write!(f, "\nCompleted: {}", self.completed())?;
        if self.warnings() > 0 {
            write!(f, " ({} with verification warnings)", self.warnings())?;
        }
        for (stage, count) in self.failed_by_stage() {
            write!(f, ", Failed({}): {}", stage, count)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(host: &str, outcome: SwitchOutcome, verification: Option<Verification>) -> SwitchReport {
        let now = Utc::now();
        SwitchReport {
            host: host.to_string(),
            dialect: Some(Dialect::IbnsV2),
            counts: None,
            outcome,
            verification,
            started_at: now,
            completed_at: now,
        }
    }

    #[test]
    fn test_verification_check() {
        assert_eq!(
            Verification::check("Enabled", "Enabled"),
            Verification::Confirmed { status: "Enabled".to_string() }
        );
        assert!(!Verification::check("Enabled", "enabled ").is_warning());
        assert_eq!(
            Verification::check("Enabled", "Disabled"),
            Verification::Mismatch {
                expected: "Enabled".to_string(),
                actual: "Disabled".to_string(),
            }
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            run_id: "run".to_string(),
            reports: vec![
                report("sw1", SwitchOutcome::Completed, None),
                report(
                    "sw2",
                    SwitchOutcome::Failed { stage: Stage::Applied, reason: "timeout".to_string() },
                    None,
                ),
                report(
                    "sw3",
                    SwitchOutcome::Completed,
                    Some(Verification::check("Enabled", "Disabled")),
                ),
            ],
        };

        assert_eq!(summary.completed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.warnings(), 1);
        assert_eq!(summary.failed_by_stage().get(&Stage::Applied), Some(&1));
        assert!(!summary.is_success());
    }

    #[test]
    fn test_summary_table() {
        let summary = RunSummary {
            run_id: "run".to_string(),
            reports: vec![
                report(
                    "switch-01",
                    SwitchOutcome::Completed,
                    Some(Verification::Unavailable { reason: "channel closed".to_string() }),
                ),
                report(
                    "sw2",
                    SwitchOutcome::Failed { stage: Stage::Planned, reason: "unrecognized region: \"north\"".to_string() },
                    None,
                ),
            ],
        };

        let table = summary.to_string();
        assert!(table.starts_with("HOST       DIALECT  STATUS"));
        assert!(table.contains("switch-01  IBNSv2   Completed (verification warning)  dot1x status unavailable: channel closed"));
        assert!(table.contains("Failed(Planned)"));
        assert!(table.ends_with("Completed: 1 (1 with verification warnings), Failed(Planned): 1\n"));
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Inventoried < Stage::Classified);
        assert!(Stage::Applied < Stage::Verified);
        assert!(Stage::Verified < Stage::Saved);
    }
}

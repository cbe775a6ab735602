use thiserror::Error;

use crate::models::Stage;

/// Errors that end a single switch's pipeline.
///
/// Verification mismatches are deliberately absent: they are advisory and live on
/// [`crate::models::Verification`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Region or dialect missing/unknown when building the render plan
    #[error("unrecognized {field}: {value:?}")]
    UnrecognizedDialectInput { field: &'static str, value: String },

    /// The device returned no switchport interfaces
    #[error("no interfaces returned for {host}")]
    EmptyInterfaceInventory { host: String },

    /// A collaborator (device, renderer, artifact store) failed
    #[error("{stage} stage failed: {message}")]
    ExternalStageFailure { stage: Stage, message: String },

    /// Host data in the inventory could not be typed
    #[error("invalid inventory data: {0}")]
    Inventory(String),

    #[error("run cancelled before {stage} stage")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    /// Wrap a collaborator error, keeping the full context chain in the message
    pub fn external(stage: Stage, err: anyhow::Error) -> Self {
        Self::ExternalStageFailure {
            stage,
            message: format!("{:#}", err),
        }
    }

    pub fn unrecognized(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnrecognizedDialectInput {
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to push config");
        let wrapped = PipelineError::external(Stage::Applied, err);
        assert_eq!(
            wrapped.to_string(),
            "Applied stage failed: Failed to push config: connection reset"
        );
    }

    #[test]
    fn test_unrecognized_message() {
        let err = PipelineError::unrecognized("region", "north");
        assert_eq!(err.to_string(), "unrecognized region: \"north\"");
    }
}

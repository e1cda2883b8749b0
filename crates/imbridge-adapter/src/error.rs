use std::fmt;

use crate::graphics::GraphicsError;

/// Pipeline configuration step that can be rejected by the graphics library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage { Blend, Depth }

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStage::Blend => "blend",
            PipelineStage::Depth => "depth",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error("{stage} setup of the GUI pipeline failed: {source}")]
    Pipeline {
        stage:  PipelineStage,
        #[source]
        source: GraphicsError,
    },

    #[error("font atlas upload failed: {0}")]
    FontTexture(#[source] GraphicsError),
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

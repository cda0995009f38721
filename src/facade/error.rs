use thiserror::Error;

use crate::mesh::{AttributeFormat, Semantic};

#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("no graphics adapter is compatible with the window surface")]
    NoAdapter,

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("failed to open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("mesh has no {0:?} attribute, the shader needs one")]
    MissingAttribute(Semantic),

    #[error("{semantic:?} reads from buffer {buffer_index}, only buffer 0 is bound")]
    UnboundAttribute { semantic: Semantic, buffer_index: usize },

    #[error("{semantic:?} is {found:?}, the shader reads {expected:?}")]
    FormatMismatch {
        semantic: Semantic,
        expected: AttributeFormat,
        found: AttributeFormat
    },

    #[error("mesh descriptor has no layout for vertex buffer 0")]
    MissingVertexLayout
}

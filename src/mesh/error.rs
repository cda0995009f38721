use thiserror::Error;

use super::buffer::BufferKind;
use super::descriptor::Semantic;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MeshError {
    #[error("attribute {semantic:?} reads from buffer {buffer_index}, which has no layout")]
    MissingLayout { semantic: Semantic, buffer_index: usize },

    #[error("descriptor has no layout for vertex buffer {buffer_index}")]
    MissingBufferLayout { buffer_index: usize },

    #[error("buffer {buffer_index} has a zero stride")]
    EmptyStride { buffer_index: usize },

    #[error("attribute {semantic:?} spans bytes {start}..{end}, past the stride of {stride}")]
    AttributeOutOfBounds {
        semantic: Semantic,
        start: usize,
        end: usize,
        stride: usize
    },

    #[error("attributes {first:?} and {second:?} overlap in buffer {buffer_index}")]
    OverlappingAttributes {
        first: Semantic,
        second: Semantic,
        buffer_index: usize
    },

    #[error("attribute {0:?} is described more than once")]
    DuplicateSemantic(Semantic),

    #[error("expected a {expected:?} buffer, got a {found:?} buffer")]
    WrongBufferKind { expected: BufferKind, found: BufferKind },

    #[error("{kind:?} buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        kind: BufferKind,
        expected: usize,
        actual: usize
    },

    #[error("index {index} in submesh '{submesh}' is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        submesh: String,
        index: u32,
        vertex_count: usize
    }
}

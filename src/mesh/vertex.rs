use std::mem;

use super::descriptor::{
    AttributeFormat,
    BufferLayout,
    Semantic,
    VertexAttribute,
    VertexDescriptor
};

/// A record type that knows its own interleaved layout.
pub(crate) trait VertexLayout: bytemuck::Pod {
    fn descriptor() -> VertexDescriptor;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
    pub(crate) uv: [f32; 2],
    pub(crate) color: [f32; 4]
}

impl VertexLayout for Vertex {
    fn descriptor() -> VertexDescriptor {
        VertexDescriptor::new()
            .with_attribute(VertexAttribute::new(
                Semantic::Position,
                AttributeFormat::Float3,
                mem::offset_of!(Vertex, position),
                0
            ))
            .with_attribute(VertexAttribute::new(
                Semantic::Normal,
                AttributeFormat::Float3,
                mem::offset_of!(Vertex, normal),
                0
            ))
            .with_attribute(VertexAttribute::new(
                Semantic::TextureCoordinate,
                AttributeFormat::Float2,
                mem::offset_of!(Vertex, uv),
                0
            ))
            .with_attribute(VertexAttribute::new(
                Semantic::Color,
                AttributeFormat::Float4,
                mem::offset_of!(Vertex, color),
                0
            ))
            .with_layout(BufferLayout { stride: mem::size_of::<Self>() })
    }
}

pub(crate) const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex {
        position: [ 0.0,  1.0, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [0.5, 1.0],
        color: [1.0, 0.0, 0.0, 1.0]
    },
    Vertex {
        position: [-1.0, -0.5, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [0.0, 0.0],
        color: [0.0, 1.0, 0.0, 1.0]
    },
    Vertex {
        position: [ 1.0, -0.5, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [1.0, 0.0],
        color: [0.0, 0.0, 1.0, 1.0]
    }
];

pub(crate) const TRIANGLE_INDICES: [u16; 3] = [0, 1, 2];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_twelve_floats() {
        assert_eq!(mem::size_of::<Vertex>(), 48);
        assert_eq!(mem::size_of::<Vertex>(), mem::size_of::<[f32; 12]>());
    }

    #[test]
    fn descriptor_offsets_follow_field_order() {
        let descriptor = Vertex::descriptor();
        let offset = |semantic| descriptor.attribute(semantic).map(|a| a.offset);

        assert_eq!(offset(Semantic::Position), Some(0));
        assert_eq!(offset(Semantic::Normal), Some(12));
        assert_eq!(offset(Semantic::TextureCoordinate), Some(24));
        assert_eq!(offset(Semantic::Color), Some(32));
        assert_eq!(descriptor.layout(0), Some(&BufferLayout { stride: 48 }));
        assert_eq!(descriptor.validate(), Ok(()));
    }

    #[test]
    fn attributes_keep_declaration_order() {
        let semantics = Vertex::descriptor()
            .attributes()
            .iter()
            .map(|a| a.semantic)
            .collect::<Vec<_>>();

        assert_eq!(
            semantics,
            vec![
                Semantic::Position,
                Semantic::Normal,
                Semantic::TextureCoordinate,
                Semantic::Color
            ]
        );
    }

    #[test]
    fn record_bytes_are_the_fields_in_order() {
        let floats: &[f32] = bytemuck::cast_slice(&TRIANGLE_VERTICES[1..2]);

        assert_eq!(
            floats,
            &[-1.0, -0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0]
        );
    }
}

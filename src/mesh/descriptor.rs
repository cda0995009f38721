use std::mem;

use super::error::MeshError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Semantic {
    Position,
    Normal,
    TextureCoordinate,
    Color
}

impl Semantic {
    /// The `@location` the shader reads this attribute from
    pub(crate) fn shader_location(&self) -> wgpu::ShaderLocation {
        match self {
            Semantic::Position => 0,
            Semantic::Normal => 1,
            Semantic::TextureCoordinate => 2,
            Semantic::Color => 3
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AttributeFormat {
    Float2,
    Float3,
    Float4
}

impl AttributeFormat {
    pub(crate) fn components(&self) -> usize {
        match self {
            AttributeFormat::Float2 => 2,
            AttributeFormat::Float3 => 3,
            AttributeFormat::Float4 => 4
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.components() * mem::size_of::<f32>()
    }

    pub(crate) fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            AttributeFormat::Float2 => wgpu::VertexFormat::Float32x2,
            AttributeFormat::Float3 => wgpu::VertexFormat::Float32x3,
            AttributeFormat::Float4 => wgpu::VertexFormat::Float32x4
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct VertexAttribute {
    pub(crate) semantic: Semantic,
    pub(crate) format: AttributeFormat,
    pub(crate) offset: usize,
    pub(crate) buffer_index: usize
}

impl VertexAttribute {
    pub(crate) fn new(semantic: Semantic, format: AttributeFormat, offset: usize, buffer_index: usize) -> Self {
        Self { semantic, format, offset, buffer_index }
    }

    // Saturates so an offset near usize::MAX reads as past any stride
    fn end(&self) -> usize {
        self.offset.saturating_add(self.format.size())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BufferLayout {
    pub(crate) stride: usize
}

/// Describes how interleaved records are laid out across one or more
/// vertex buffers. Attributes keep the order they were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct VertexDescriptor {
    attributes: Vec<VertexAttribute>,
    layouts: Vec<BufferLayout>
}

impl VertexDescriptor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub(crate) fn with_layout(mut self, layout: BufferLayout) -> Self {
        self.layouts.push(layout);
        self
    }

    pub(crate) fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub(crate) fn attribute(&self, semantic: Semantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    pub(crate) fn layout(&self, buffer_index: usize) -> Option<&BufferLayout> {
        self.layouts.get(buffer_index)
    }

    pub(crate) fn validate(&self) -> Result<(), MeshError> {
        for (buffer_index, layout) in self.layouts.iter().enumerate() {
            if layout.stride == 0 {
                return Err(MeshError::EmptyStride { buffer_index });
            }
        }

        for (i, attribute) in self.attributes.iter().enumerate() {
            let layout = self.layout(attribute.buffer_index).ok_or(
                MeshError::MissingLayout {
                    semantic: attribute.semantic,
                    buffer_index: attribute.buffer_index
                }
            )?;

            if attribute.end() > layout.stride {
                return Err(MeshError::AttributeOutOfBounds {
                    semantic: attribute.semantic,
                    start: attribute.offset,
                    end: attribute.end(),
                    stride: layout.stride
                });
            }

            // Only compare against earlier attributes, each pair is seen once
            for other in self.attributes[..i].iter() {
                if other.semantic == attribute.semantic {
                    return Err(MeshError::DuplicateSemantic(attribute.semantic));
                }

                if other.buffer_index == attribute.buffer_index
                    && other.offset < attribute.end()
                    && attribute.offset < other.end()
                {
                    return Err(MeshError::OverlappingAttributes {
                        first: other.semantic,
                        second: attribute.semantic,
                        buffer_index: attribute.buffer_index
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn wgpu_attributes(&self, buffer_index: usize) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .filter(|a| a.buffer_index == buffer_index)
            .map(|a| wgpu::VertexAttribute {
                format: a.format.to_wgpu(),
                offset: a.offset as wgpu::BufferAddress,
                shader_location: a.semantic.shader_location()
            })
            .collect()
    }

    /// Borrows `attributes`, which should come from `wgpu_attributes`
    /// for the same buffer index.
    pub(crate) fn description<'a>(
        &self,
        buffer_index: usize,
        attributes: &'a [wgpu::VertexAttribute]
    ) -> Option<wgpu::VertexBufferLayout<'a>> {
        let layout = self.layout(buffer_index)?;

        Some(wgpu::VertexBufferLayout {
            array_stride: layout.stride as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes
        })
    }
}

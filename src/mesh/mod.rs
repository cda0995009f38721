mod buffer;
mod descriptor;
mod error;
mod vertex;

use std::mem;

pub(crate) use buffer::{BufferKind, MeshBuffer};
pub(crate) use descriptor::{AttributeFormat, Semantic, VertexDescriptor};
#[cfg(test)]
pub(crate) use descriptor::{BufferLayout, VertexAttribute};
pub(crate) use error::MeshError;
pub(crate) use vertex::VertexLayout;

use vertex::{TRIANGLE_INDICES, TRIANGLE_VERTICES};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum IndexType {
    UInt16,
    UInt32
}

impl IndexType {
    pub(crate) fn size(&self) -> usize {
        match self {
            IndexType::UInt16 => mem::size_of::<u16>(),
            IndexType::UInt32 => mem::size_of::<u32>()
        }
    }

    pub(crate) fn to_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexType::UInt16 => wgpu::IndexFormat::Uint16,
            IndexType::UInt32 => wgpu::IndexFormat::Uint32
        }
    }
}

/// Index element types a submesh can be packed from.
pub(crate) trait IndexElement: bytemuck::Pod {
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::UInt16;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::UInt32;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum GeometryType {
    Triangles
}

impl GeometryType {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            GeometryType::Triangles => wgpu::PrimitiveTopology::TriangleList
        }
    }
}

/// A group of indices into the mesh's shared vertex buffer,
/// drawn with a single topology.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Submesh {
    name: String,
    index_buffer: MeshBuffer,
    index_count: usize,
    index_type: IndexType,
    geometry_type: GeometryType
}

impl Submesh {
    pub(crate) fn new(
        name: impl Into<String>,
        index_buffer: MeshBuffer,
        index_count: usize,
        index_type: IndexType,
        geometry_type: GeometryType
    ) -> Result<Self, MeshError> {
        // An unrepresentable size can never match, so saturate instead of wrapping
        expect_buffer(&index_buffer, BufferKind::Index, index_count.saturating_mul(index_type.size()))?;

        Ok(Self {
            name: name.into(),
            index_buffer,
            index_count,
            index_type,
            geometry_type
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn index_buffer(&self) -> &MeshBuffer {
        &self.index_buffer
    }

    pub(crate) fn index_count(&self) -> usize {
        self.index_count
    }

    pub(crate) fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub(crate) fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub(crate) fn indices(&self) -> Vec<u32> {
        match self.index_type {
            IndexType::UInt16 => self.index_buffer
                .read::<u16>()
                .into_iter()
                .map(u32::from)
                .collect(),
            IndexType::UInt32 => self.index_buffer.read::<u32>()
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) min: [f32; 3],
    pub(crate) max: [f32; 3]
}

impl Bounds {
    pub(crate) fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5
        ]
    }

    /// Radius of the sphere through the box corners
    pub(crate) fn radius(&self) -> f32 {
        let dx = self.max[0] - self.min[0];
        let dy = self.max[1] - self.min[1];
        let dz = self.max[2] - self.min[2];

        (dx * dx + dy * dy + dz * dz).sqrt() * 0.5
    }
}

/// Interleaved vertex data, the descriptor explaining it,
/// and the submeshes that index into it. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Mesh {
    vertex_buffer: MeshBuffer,
    vertex_count: usize,
    descriptor: VertexDescriptor,
    submeshes: Vec<Submesh>
}

impl Mesh {
    pub(crate) fn new(
        vertex_buffer: MeshBuffer,
        vertex_count: usize,
        descriptor: VertexDescriptor,
        submeshes: Vec<Submesh>
    ) -> Result<Self, MeshError> {
        descriptor.validate()?;

        // Only buffer 0 is backed by storage
        let stride = descriptor
            .layout(0)
            .map(|layout| layout.stride)
            .ok_or(MeshError::MissingBufferLayout { buffer_index: 0 })?;

        expect_buffer(&vertex_buffer, BufferKind::Vertex, stride.saturating_mul(vertex_count))?;

        for submesh in submeshes.iter() {
            if let Some(&index) = submesh.indices().iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    submesh: submesh.name.clone(),
                    index,
                    vertex_count
                });
            }
        }

        log::info!(
            "built mesh: {} vertices ({} bytes), {} submesh(es)",
            vertex_count,
            vertex_buffer.len(),
            submeshes.len()
        );

        for attribute in descriptor.attributes() {
            log::debug!(
                "  {:?}: {:?} at offset {} in buffer {}",
                attribute.semantic,
                attribute.format,
                attribute.offset,
                attribute.buffer_index
            );
        }

        Ok(Self {
            vertex_buffer,
            vertex_count,
            descriptor,
            submeshes
        })
    }

    /// Packs `records` and `indices` into fresh buffers and wraps them
    /// in a mesh with a single triangle-list submesh.
    pub(crate) fn from_records<V: VertexLayout, I: IndexElement>(
        records: &[V],
        indices: &[I]
    ) -> Result<Self, MeshError> {
        let vertex_buffer = MeshBuffer::pack(records, BufferKind::Vertex);
        let index_buffer = MeshBuffer::pack(indices, BufferKind::Index);

        let submesh = Submesh::new(
            "submesh",
            index_buffer,
            indices.len(),
            I::INDEX_TYPE,
            GeometryType::Triangles
        )?;

        Self::new(vertex_buffer, records.len(), V::descriptor(), vec![submesh])
    }

    pub(crate) fn triangle() -> Result<Self, MeshError> {
        Self::from_records(&TRIANGLE_VERTICES, &TRIANGLE_INDICES)
    }

    pub(crate) fn vertex_buffer(&self) -> &MeshBuffer {
        &self.vertex_buffer
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub(crate) fn descriptor(&self) -> &VertexDescriptor {
        &self.descriptor
    }

    pub(crate) fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Reads one attribute of every vertex through the descriptor.
    /// Components past the attribute's format are left at 0.
    pub(crate) fn attribute_values(&self, semantic: Semantic) -> Option<Vec<[f32; 4]>> {
        let attribute = self.descriptor.attribute(semantic)?;
        if attribute.buffer_index != 0 {
            return None;
        }

        let stride = self.descriptor.layout(0)?.stride;
        let components = attribute.format.components();
        let bytes = self.vertex_buffer.bytes();

        let values = (0..self.vertex_count).map(|vertex| {
            let start = vertex * stride + attribute.offset;

            let mut value = [0f32; 4];
            for (component, chunk) in bytes[start..start + components * mem::size_of::<f32>()]
                .chunks_exact(mem::size_of::<f32>())
                .enumerate()
            {
                value[component] = bytemuck::pod_read_unaligned(chunk);
            }

            value
        } ).collect();

        Some(values)
    }

    pub(crate) fn bounds(&self) -> Option<Bounds> {
        let positions = self.attribute_values(Semantic::Position)?;

        let mut positions = positions.into_iter();
        let first = positions.next()?;

        let mut bounds = Bounds {
            min: [first[0], first[1], first[2]],
            max: [first[0], first[1], first[2]]
        };

        for position in positions {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(position[axis]);
                bounds.max[axis] = bounds.max[axis].max(position[axis]);
            }
        }

        Some(bounds)
    }
}

fn expect_buffer(buffer: &MeshBuffer, kind: BufferKind, len: usize) -> Result<(), MeshError> {
    if buffer.kind() != kind {
        return Err(MeshError::WrongBufferKind {
            expected: kind,
            found: buffer.kind()
        });
    }

    if buffer.len() != len {
        return Err(MeshError::BufferSizeMismatch {
            kind,
            expected: len,
            actual: buffer.len()
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::vertex::Vertex;

    #[test]
    fn triangle_vertex_buffer_is_the_records_back_to_back() {
        let mesh = Mesh::triangle().unwrap();

        let mut expected = Vec::new();
        for vertex in TRIANGLE_VERTICES.iter() {
            expected.extend_from_slice(bytemuck::bytes_of(vertex));
        }

        assert_eq!(mesh.vertex_buffer().len(), 3 * 48);
        assert_eq!(mesh.vertex_buffer().bytes(), expected.as_slice());
        assert_eq!(mesh.vertex_buffer().read::<Vertex>(), TRIANGLE_VERTICES.to_vec());
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn triangle_has_one_triangle_list_submesh() {
        let mesh = Mesh::triangle().unwrap();
        let submeshes = mesh.submeshes();

        assert_eq!(submeshes.len(), 1);
        assert_eq!(submeshes[0].geometry_type(), GeometryType::Triangles);
        assert_eq!(submeshes[0].index_type(), IndexType::UInt16);
        assert_eq!(submeshes[0].index_count(), 3);
        assert_eq!(submeshes[0].index_buffer().read::<u16>(), vec![0, 1, 2]);
        assert_eq!(submeshes[0].indices(), vec![0, 1, 2]);
    }

    #[test]
    fn index_past_vertex_count_is_rejected() {
        let result = Mesh::from_records(&TRIANGLE_VERTICES, &[0u16, 1, 3]);

        assert_eq!(
            result,
            Err(MeshError::IndexOutOfRange {
                submesh: "submesh".to_string(),
                index: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn vertex_buffer_must_match_stride_times_count() {
        let buffer = MeshBuffer::pack(&TRIANGLE_VERTICES, BufferKind::Vertex);

        assert_eq!(
            Mesh::new(buffer, 4, Vertex::descriptor(), Vec::new()),
            Err(MeshError::BufferSizeMismatch {
                kind: BufferKind::Vertex,
                expected: 192,
                actual: 144
            })
        );
    }

    #[test]
    fn huge_vertex_count_is_a_size_mismatch() {
        let buffer = MeshBuffer::pack(&TRIANGLE_VERTICES, BufferKind::Vertex);

        assert_eq!(
            Mesh::new(buffer, usize::MAX, Vertex::descriptor(), Vec::new()),
            Err(MeshError::BufferSizeMismatch {
                kind: BufferKind::Vertex,
                expected: usize::MAX,
                actual: 144
            })
        );
    }

    #[test]
    fn huge_index_count_is_a_size_mismatch() {
        let indices = MeshBuffer::pack(&[0u16, 1, 2], BufferKind::Index);

        assert_eq!(
            Submesh::new("x", indices, usize::MAX, IndexType::UInt32, GeometryType::Triangles),
            Err(MeshError::BufferSizeMismatch {
                kind: BufferKind::Index,
                expected: usize::MAX,
                actual: 6
            })
        );
    }

    #[test]
    fn descriptor_without_a_vertex_buffer_layout_is_rejected() {
        let descriptor = VertexDescriptor::new();
        let buffer = MeshBuffer::zeroed(0, BufferKind::Vertex);

        assert_eq!(
            Mesh::new(buffer, 0, descriptor, Vec::new()),
            Err(MeshError::MissingBufferLayout { buffer_index: 0 })
        );
    }

    #[test]
    fn submesh_wants_an_index_buffer_of_the_right_width() {
        let indices = MeshBuffer::pack(&[0u16, 1, 2], BufferKind::Index);
        let mislabeled = MeshBuffer::pack(&[0u16, 1, 2], BufferKind::Vertex);

        assert_eq!(
            Submesh::new("wide", indices, 3, IndexType::UInt32, GeometryType::Triangles),
            Err(MeshError::BufferSizeMismatch {
                kind: BufferKind::Index,
                expected: 12,
                actual: 6
            })
        );

        assert_eq!(
            Submesh::new("kind", mislabeled, 3, IndexType::UInt16, GeometryType::Triangles),
            Err(MeshError::WrongBufferKind {
                expected: BufferKind::Index,
                found: BufferKind::Vertex
            })
        );
    }

    #[test]
    fn u32_indices_are_read_back() {
        let mesh = Mesh::from_records(&TRIANGLE_VERTICES, &[2u32, 1, 0]).unwrap();
        let submesh = &mesh.submeshes()[0];

        assert_eq!(submesh.index_type(), IndexType::UInt32);
        assert_eq!(submesh.index_buffer().len(), 12);
        assert_eq!(submesh.indices(), vec![2, 1, 0]);
        assert_eq!(submesh.name(), "submesh");
    }

    #[test]
    fn colors_are_read_through_the_descriptor() {
        let mesh = Mesh::triangle().unwrap();
        let colors = mesh.attribute_values(Semantic::Color).unwrap();
        let uvs = mesh.attribute_values(Semantic::TextureCoordinate).unwrap();

        assert_eq!(colors[1], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(uvs[0], [0.5, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn triangle_bounds() {
        let bounds = Mesh::triangle().unwrap().bounds().unwrap();

        assert_eq!(bounds.min, [-1.0, -0.5, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 0.0]);
        assert_eq!(bounds.center(), [0.0, 0.25, 0.0]);
        assert!((bounds.radius() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let mesh = Mesh::from_records::<Vertex, u16>(&[], &[]).unwrap();

        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn triangles_draw_as_a_triangle_list() {
        assert_eq!(GeometryType::Triangles.to_wgpu(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(IndexType::UInt32.to_wgpu(), wgpu::IndexFormat::Uint32);
    }
}

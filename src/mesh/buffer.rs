use std::mem;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BufferKind {
    Vertex,
    Index
}

/// A contiguous, owned region of bytes destined for either the vertex
/// or the index slot of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MeshBuffer {
    bytes: Vec<u8>,
    kind: BufferKind
}

impl MeshBuffer {
    pub(crate) fn zeroed(len: usize, kind: BufferKind) -> Self {
        Self {
            bytes: vec![0u8; len],
            kind
        }
    }

    /// Allocates `size_of::<T>() * items.len()` zeroed bytes and copies
    /// the records into them verbatim.
    pub(crate) fn pack<T: bytemuck::Pod>(items: &[T], kind: BufferKind) -> Self {
        let mut buffer = Self::zeroed(mem::size_of::<T>() * items.len(), kind);

        buffer.bytes.copy_from_slice(bytemuck::cast_slice(items));
        buffer
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Reads the region back as records of `T`.
    /// Trailing bytes that don't fill a whole record are ignored.
    pub(crate) fn read<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.bytes
            .chunks_exact(mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

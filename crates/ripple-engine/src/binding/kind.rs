use std::fmt;

/// Buffer binding kind, mirroring the WGSL address-space taxonomy.
///
/// The kind fixes both the layout entry's binding type and the usage flags
/// of the backing buffer. Shaders must declare the matching address space
/// and access mode; the pairing is exact, not "at least as permissive"
/// (`var<storage, read>` binds only to `ReadOnlyStorage`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BindingKind {
    Uniform,
    Storage,
    ReadOnlyStorage,
}

impl BindingKind {
    /// Binding type for the slot's bind-group layout entry.
    pub fn buffer_binding_type(self) -> wgpu::BufferBindingType {
        match self {
            BindingKind::Uniform => wgpu::BufferBindingType::Uniform,
            BindingKind::Storage => wgpu::BufferBindingType::Storage { read_only: false },
            BindingKind::ReadOnlyStorage => wgpu::BufferBindingType::Storage { read_only: true },
        }
    }

    /// Usage flags for the backing buffer.
    ///
    /// COPY_DST is always present: every kind is updated by whole-buffer
    /// queue writes.
    pub fn buffer_usages(self) -> wgpu::BufferUsages {
        match self {
            BindingKind::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            BindingKind::Storage | BindingKind::ReadOnlyStorage => {
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST
            }
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Uniform => "uniform",
            BindingKind::Storage => "read-write storage",
            BindingKind::ReadOnlyStorage => "read-only storage",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_types_match_the_address_spaces() {
        assert_eq!(
            BindingKind::Uniform.buffer_binding_type(),
            wgpu::BufferBindingType::Uniform
        );
        assert_eq!(
            BindingKind::Storage.buffer_binding_type(),
            wgpu::BufferBindingType::Storage { read_only: false }
        );
        assert_eq!(
            BindingKind::ReadOnlyStorage.buffer_binding_type(),
            wgpu::BufferBindingType::Storage { read_only: true }
        );
    }

    #[test]
    fn every_kind_is_writable_from_the_host() {
        for kind in [
            BindingKind::Uniform,
            BindingKind::Storage,
            BindingKind::ReadOnlyStorage,
        ] {
            assert!(kind.buffer_usages().contains(wgpu::BufferUsages::COPY_DST));
        }
    }

    #[test]
    fn uniform_and_storage_usages_do_not_overlap() {
        assert!(
            BindingKind::Uniform
                .buffer_usages()
                .contains(wgpu::BufferUsages::UNIFORM)
        );
        assert!(
            !BindingKind::Uniform
                .buffer_usages()
                .contains(wgpu::BufferUsages::STORAGE)
        );
        assert!(
            BindingKind::Storage
                .buffer_usages()
                .contains(wgpu::BufferUsages::STORAGE)
        );
    }
}

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use super::error::BindingError;
use super::kind::BindingKind;

/// One registered resource: a GPU buffer plus the CPU byte mirror it was
/// last written from.
///
/// The byte length is fixed at registration; `ResourceBinder::update`
/// rejects any write of a different length, so the allocation never resizes.
#[derive(Debug)]
pub struct Binding {
    name: String,
    kind: BindingKind,
    visibility: wgpu::ShaderStages,
    mirror: Vec<u8>,
    buffer: wgpu::Buffer,
}

impl Binding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn visibility(&self) -> wgpu::ShaderStages {
        self.visibility
    }

    /// Length fixed at registration, in bytes.
    pub fn byte_len(&self) -> usize {
        self.mirror.len()
    }

    /// Current CPU copy of the buffer contents.
    ///
    /// The GPU copy is always a whole-buffer upload of this slice, so the
    /// two agree after every successful `update`.
    pub fn mirror(&self) -> &[u8] {
        &self.mirror
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    fn slot_binding(&self, slot: u32) -> SlotBinding<'_> {
        SlotBinding {
            layout_entry: wgpu::BindGroupLayoutEntry {
                binding: slot,
                visibility: self.visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: self.kind.buffer_binding_type(),
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(self.mirror.len() as u64),
                },
                count: None,
            },
            bind_group_entry: wgpu::BindGroupEntry {
                binding: slot,
                resource: self.buffer.as_entire_binding(),
            },
        }
    }
}

/// Layout entry and bind-group entry for one slot.
///
/// Both entries are derived from the same `Binding` in one pass, so the
/// shader-visible description and the buffer actually bound cannot drift
/// apart.
pub struct SlotBinding<'a> {
    pub layout_entry: wgpu::BindGroupLayoutEntry,
    pub bind_group_entry: wgpu::BindGroupEntry<'a>,
}

/// Proof of a completed registration. Names the slot for later updates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResourceHandle {
    slot: u32,
}

impl ResourceHandle {
    pub fn slot(self) -> u32 {
        self.slot
    }
}

/// Registry mapping binding slots to named, CPU-mirrored GPU buffers.
///
/// The binder is passive: it owns no device or queue and is handed them per
/// call, so it can be driven by whichever component currently holds the GPU
/// context. Slot bookkeeping is a single ordered map; iteration yields slots
/// in ascending order, which is also the order pipelines see them in.
#[derive(Debug, Default)]
pub struct ResourceBinder {
    bindings: BTreeMap<u32, Binding>,
}

impl ResourceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a buffer of `contents.len()` bytes at `slot`, uploads
    /// `contents`, and records the slot's layout and bind-group entries.
    ///
    /// Fails with `DuplicateSlot` if the slot is taken and `InvalidUsage` if
    /// `contents` is empty (a zero-sized buffer cannot be bound). The binder
    /// is unchanged on error.
    pub fn register(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        slot: u32,
        contents: &[u8],
        kind: BindingKind,
        visibility: wgpu::ShaderStages,
    ) -> Result<ResourceHandle, BindingError> {
        let existing = self.bindings.get(&slot).map(|binding| binding.name.as_str());
        validate_registration(existing, name, slot, contents)?;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(name),
            size: contents.len() as u64,
            usage: kind.buffer_usages(),
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, contents);

        log::debug!(
            "bound `{name}` at slot {slot}: {} bytes, {kind:?}",
            contents.len()
        );

        self.bindings.insert(
            slot,
            Binding {
                name: name.to_owned(),
                kind,
                visibility,
                mirror: contents.to_vec(),
                buffer,
            },
        );

        Ok(ResourceHandle { slot })
    }

    /// Replaces the mirror and issues a whole-buffer queue write.
    ///
    /// This is the only mutation path; there is no partial-range write, so
    /// even single-field updates rewrite the full buffer. Fails with
    /// `SizeMismatch` when `contents.len()` differs from the registered
    /// length, leaving mirror and GPU copy untouched.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        handle: ResourceHandle,
        contents: &[u8],
    ) -> Result<(), BindingError> {
        let binding = self.bindings.get_mut(&handle.slot).ok_or_else(|| {
            BindingError::InvalidUsage {
                name: format!("slot {}", handle.slot),
                reason: "handle does not belong to this binder".to_owned(),
            }
        })?;

        write_mirror(&binding.name, &mut binding.mirror, contents)?;
        queue.write_buffer(&binding.buffer, 0, &binding.mirror);
        Ok(())
    }

    /// The binding registered at `slot`, if any.
    pub fn at_slot(&self, slot: u32) -> Option<&Binding> {
        self.bindings.get(&slot)
    }

    /// Registered bindings in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Binding)> {
        self.bindings.iter().map(|(slot, binding)| (*slot, binding))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Layout and bind-group entries for every slot, in slot order.
    pub fn slot_bindings(&self) -> Vec<SlotBinding<'_>> {
        self.bindings
            .iter()
            .map(|(slot, binding)| binding.slot_binding(*slot))
            .collect()
    }
}

fn validate_registration(
    existing: Option<&str>,
    name: &str,
    slot: u32,
    contents: &[u8],
) -> Result<(), BindingError> {
    if let Some(existing) = existing {
        return Err(BindingError::DuplicateSlot {
            slot,
            existing: existing.to_owned(),
            requested: name.to_owned(),
        });
    }

    if contents.is_empty() {
        return Err(BindingError::InvalidUsage {
            name: name.to_owned(),
            reason: "initial contents are empty; a zero-sized buffer cannot be bound".to_owned(),
        });
    }

    Ok(())
}

fn write_mirror(name: &str, mirror: &mut [u8], contents: &[u8]) -> Result<(), BindingError> {
    if contents.len() != mirror.len() {
        return Err(BindingError::SizeMismatch {
            name: name.to_owned(),
            expected: mirror.len(),
            actual: contents.len(),
        });
    }

    mirror.copy_from_slice(contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_slots_reject_a_second_registration() {
        let err = validate_registration(Some("clock"), "pointer", 1, &[0u8; 8]).unwrap_err();
        assert_eq!(
            err,
            BindingError::DuplicateSlot {
                slot: 1,
                existing: "clock".to_owned(),
                requested: "pointer".to_owned(),
            }
        );
    }

    #[test]
    fn empty_contents_cannot_describe_a_buffer() {
        let err = validate_registration(None, "state", 0, &[]).unwrap_err();
        assert!(matches!(err, BindingError::InvalidUsage { .. }));
    }

    #[test]
    fn free_slot_with_contents_passes_validation() {
        assert!(validate_registration(None, "canvas", 2, &[0u8; 8]).is_ok());
    }

    #[test]
    fn wrong_length_write_leaves_the_mirror_unchanged() {
        let mut mirror = vec![1u8, 2, 3, 4];

        let err = write_mirror("clock", &mut mirror, &[9u8; 8]).unwrap_err();
        assert_eq!(
            err,
            BindingError::SizeMismatch {
                name: "clock".to_owned(),
                expected: 4,
                actual: 8,
            }
        );
        assert_eq!(mirror, vec![1, 2, 3, 4]);
    }

    #[test]
    fn matching_length_write_replaces_the_mirror() {
        let mut mirror = vec![0u8; 4];

        write_mirror("pointer", &mut mirror, &[7u8, 8, 9, 10]).unwrap();
        assert_eq!(mirror, vec![7, 8, 9, 10]);
    }
}

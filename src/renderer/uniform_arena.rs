//! Transient Uniform Arena
//!
//! Per-draw uniforms that only live for one frame (e.g. the shadow pass's
//! light-space × model pair) come from a growable arena of small uniform
//! buffers, each with its own bind group.
//!
//! ```text
//! begin_frame()   generation += 1, cursor = 0
//! allocate(data)  slot[cursor] exists → rewrite it
//!                 otherwise           → create slot, push
//!                 cursor += 1
//! ```
//!
//! Slots are never freed during rendering; the arena's high-water mark is
//! the largest number of draws seen in a single frame.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// What `allocate` did with the slot it handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    /// Existing slot rewritten in place.
    Reuse(usize),
    /// New slot appended.
    Grow(usize),
}

impl SlotAction {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Reuse(i) | Self::Grow(i) => i,
        }
    }
}

/// Cursor bookkeeping of the arena, independent of any GPU object.
#[derive(Debug, Default, Clone)]
pub struct ArenaCursor {
    cursor: usize,
    capacity: usize,
    generation: u64,
}

impl ArenaCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cursor = 0;
    }

    pub fn next_slot(&mut self) -> SlotAction {
        let index = self.cursor;
        self.cursor += 1;
        if index < self.capacity {
            SlotAction::Reuse(index)
        } else {
            self.capacity += 1;
            SlotAction::Grow(index)
        }
    }

    /// Slots handed out in the current frame.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Slots ever created.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.capacity = 0;
    }
}

struct ArenaSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Growable pool of single-struct uniform buffers bound at binding 0 of
/// `layout`.
pub struct UniformArena<T: bytemuck::Pod> {
    label: &'static str,
    layout: wgpu::BindGroupLayout,
    cursor: ArenaCursor,
    slots: Vec<ArenaSlot>,
    _marker: PhantomData<T>,
}

impl<T: bytemuck::Pod> UniformArena<T> {
    #[must_use]
    pub fn new(label: &'static str, layout: wgpu::BindGroupLayout) -> Self {
        Self {
            label,
            layout,
            cursor: ArenaCursor::new(),
            slots: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn begin_frame(&mut self) {
        self.cursor.begin_frame();
    }

    /// Stores `data` in the next free slot and returns its index.
    pub fn allocate(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &T) -> usize {
        match self.cursor.next_slot() {
            SlotAction::Reuse(index) => {
                queue.write_buffer(&self.slots[index].buffer, 0, bytemuck::bytes_of(data));
                index
            }
            SlotAction::Grow(index) => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(self.label),
                    contents: bytemuck::bytes_of(data),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(self.label),
                    layout: &self.layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                self.slots.push(ArenaSlot { buffer, bind_group });
                log::debug!("{} grew to {} slots", self.label, self.slots.len());
                index
            }
        }
    }

    #[must_use]
    pub fn bind_group(&self, index: usize) -> Option<&wgpu::BindGroup> {
        self.slots.get(index).map(|slot| &slot.bind_group)
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.cursor.generation()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Destroys every slot buffer.
    pub fn destroy(&mut self) {
        for slot in self.slots.drain(..) {
            slot.buffer.destroy();
        }
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_grows_then_later_frames_reuse() {
        let mut cursor = ArenaCursor::new();
        cursor.begin_frame();
        assert_eq!(cursor.next_slot(), SlotAction::Grow(0));
        assert_eq!(cursor.next_slot(), SlotAction::Grow(1));

        cursor.begin_frame();
        assert_eq!(cursor.next_slot(), SlotAction::Reuse(0));
        assert_eq!(cursor.next_slot(), SlotAction::Reuse(1));
        assert_eq!(cursor.next_slot(), SlotAction::Grow(2));
        assert_eq!(cursor.capacity(), 3);
        assert_eq!(cursor.generation(), 2);
    }

    #[test]
    fn begin_frame_resets_cursor_only() {
        let mut cursor = ArenaCursor::new();
        cursor.begin_frame();
        let _ = cursor.next_slot();
        let _ = cursor.next_slot();
        cursor.begin_frame();
        assert_eq!(cursor.used(), 0);
        assert_eq!(cursor.capacity(), 2);
    }
}

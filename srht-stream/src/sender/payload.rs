//! Pooled packet buffers
//!
//! A [`Payload`] is one reusable send buffer holding exactly one SRHT
//! packet. Ownership moves whole: producer -> submit queue -> I/O thread ->
//! pool, never shared. The [`PayloadPool`] free list is bounded, so a stall
//! in the I/O thread caps memory instead of growing it.

use std::collections::VecDeque;
use std::sync::Mutex;

use srht_protocol::wire::{
    FrameFlags, FrameHeader, JointDefinition, ROOT_PARENT, SkeletonFlags, SkeletonHeader,
    write_packed_rotation, write_rotation,
};

use crate::skeleton::Skeleton;

/// One pooled send buffer
///
/// Writes append at the end; `set_skeleton`/`set_frame` reset the buffer
/// and write a packet header, the `push_*` methods append records.
#[derive(Debug, Default)]
pub struct Payload {
    buf: Vec<u8>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized packet bytes written so far
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a complete skeleton packet: header plus one joint definition
    /// per joint, offsets scaled by `scaling`.
    pub fn set_skeleton(&mut self, skeleton: &Skeleton, scaling: f32) {
        self.buf.clear();
        SkeletonHeader {
            skeleton_id: skeleton.id,
            joint_count: skeleton.joints.len() as u16,
            flags: SkeletonFlags::empty(),
        }
        .write_to(&mut self.buf);

        for joint in &skeleton.joints {
            let offset = joint.offset * scaling;
            JointDefinition {
                parent: joint.parent.unwrap_or(ROOT_PARENT),
                bone: joint.bone.to_wire(),
                offset: offset.to_array(),
            }
            .write_to(&mut self.buf);
        }
    }

    /// Start a frame packet: header only, rotation records follow via
    /// [`push_packed`] or [`push_rotation`].
    ///
    /// [`push_packed`]: Payload::push_packed
    /// [`push_rotation`]: Payload::push_rotation
    pub fn set_frame(&mut self, skeleton_id: u16, time_ns: i64, root_position: [f32; 3], pack: bool) {
        self.buf.clear();
        let flags = if pack {
            FrameFlags::QUAT32
        } else {
            FrameFlags::empty()
        };
        FrameHeader {
            time_ns,
            flags,
            skeleton_id,
            root_position,
        }
        .write_to(&mut self.buf);
    }

    /// Append a 4-byte packed rotation record
    pub fn push_packed(&mut self, packed: u32) {
        write_packed_rotation(&mut self.buf, packed);
    }

    /// Append a 16-byte plain rotation record
    pub fn push_rotation(&mut self, rotation: [f32; 4]) {
        write_rotation(&mut self.buf, rotation);
    }
}

struct PoolState {
    free: VecDeque<Payload>,
    /// Buffers handed out over the pool's lifetime; never exceeds capacity
    allocated: usize,
}

/// Fixed-capacity FIFO free list of payload buffers
///
/// The lock is held only for the push/pop itself. `try_acquire` never
/// blocks: once `capacity` buffers are in flight it returns `None` and the
/// caller drops the packet.
pub(crate) struct PayloadPool {
    state: Mutex<PoolState>,
    capacity: usize,
}

impl PayloadPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                free: VecDeque::with_capacity(capacity),
                allocated: 0,
            }),
            capacity,
        }
    }

    /// Pop a free buffer, or allocate one while under capacity.
    pub(crate) fn try_acquire(&self) -> Option<Payload> {
        let mut state = self.state.lock().unwrap();
        if let Some(payload) = state.free.pop_front() {
            return Some(payload);
        }
        if state.allocated < self.capacity {
            state.allocated += 1;
            return Some(Payload::new());
        }
        None
    }

    /// Return a buffer to the free list.
    pub(crate) fn release(&self, payload: Payload) {
        let mut state = self.state.lock().unwrap();
        state.free.push_back(payload);
    }

    #[cfg(test)]
    fn allocated(&self) -> usize {
        self.state.lock().unwrap().allocated
    }
}

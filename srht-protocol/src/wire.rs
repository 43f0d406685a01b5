//! SRHT wire format (encode side)
//!
//! Binary layout for the SRHT ("Single-Root Hierarchical Transformation")
//! UDP streaming protocol. One datagram carries either a skeleton packet
//! (sent once per skeleton, retransmittable) or a frame packet (sent per
//! animation sample). All integers and floats are little-endian.
//!
//! # Layout
//!
//! ```text
//! Skeleton packet:
//!   SkeletonHeader (16 bytes):
//!     0x00: magic           8 bytes  "SRHTSKL1"
//!     0x08: skeleton_id     u16
//!     0x0A: joint_count     u16
//!     0x0C: flags           u32      SkeletonFlags
//!   JointDefinition x joint_count (16 bytes each):
//!     0x00: parent          u16      0xFFFF for the root
//!     0x02: bone            u16      humanoid bone tag, 0 = unknown
//!     0x04: offset          3 x f32  translation from parent
//!
//! Frame packet:
//!   FrameHeader (40 bytes):
//!     0x00: magic           8 bytes  "SRHTFRM1"
//!     0x08: time_ns         i64      sample timestamp in nanoseconds
//!     0x10: flags           u32      FrameFlags
//!     0x14: skeleton_id     u16
//!     0x16: padding         2 bytes  zero
//!     0x18: root_position   3 x f32
//!     0x24: padding         4 bytes  zero
//!   Rotation records x joint_count, same order as the skeleton packet's
//!   joint records (index 0 = root):
//!     QUAT32 set:     u32 packed quaternion  (4 bytes, see quat32 module)
//!     QUAT32 clear:   4 x f32 quaternion x/y/z/w (16 bytes)
//! ```
//!
//! The padding bytes keep the header byte-compatible with the original
//! C struct layout. There is no version negotiation; a receiver rejects a
//! mismatched magic. No receiver is implemented here.

use bitflags::bitflags;

/// Magic tag opening every skeleton packet
pub const SKELETON_MAGIC: [u8; 8] = *b"SRHTSKL1";

/// Magic tag opening every frame packet
pub const FRAME_MAGIC: [u8; 8] = *b"SRHTFRM1";

/// Wire value of a root joint's parent index
pub const ROOT_PARENT: u16 = u16::MAX;

bitflags! {
    /// Skeleton packet flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SkeletonFlags: u32 {
        /// A packed initial rotation per joint follows the joint array.
        ///
        /// Reserved: defined by the protocol but never set by this sender.
        const HAS_INITIAL_ROTATION = 0x1;
    }
}

bitflags! {
    /// Frame packet flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FrameFlags: u32 {
        /// Rotation records are 4-byte packed quaternions instead of
        /// 16-byte plain quaternions. Uniform for the whole packet.
        const QUAT32 = 0x1;
    }
}

/// Skeleton packet header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonHeader {
    pub skeleton_id: u16,
    pub joint_count: u16,
    pub flags: SkeletonFlags,
}

impl SkeletonHeader {
    pub const SIZE: usize = 16;

    /// Append the 16-byte header to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&SKELETON_MAGIC);
        buf.extend_from_slice(&self.skeleton_id.to_le_bytes());
        buf.extend_from_slice(&self.joint_count.to_le_bytes());
        buf.extend_from_slice(&self.flags.bits().to_le_bytes());
    }
}

/// One joint record in a skeleton packet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDefinition {
    /// Index of the parent joint, [`ROOT_PARENT`] for the root
    pub parent: u16,
    /// Humanoid bone tag, 0 for unknown
    pub bone: u16,
    /// Translation from the parent joint
    pub offset: [f32; 3],
}

impl JointDefinition {
    pub const SIZE: usize = 16;

    /// Append the 16-byte record to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.parent.to_le_bytes());
        buf.extend_from_slice(&self.bone.to_le_bytes());
        for c in self.offset {
            buf.extend_from_slice(&c.to_le_bytes());
        }
    }
}

/// Frame packet header
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    /// Sample timestamp in nanoseconds
    pub time_ns: i64,
    pub flags: FrameFlags,
    pub skeleton_id: u16,
    /// World position of the root joint
    pub root_position: [f32; 3],
}

impl FrameHeader {
    pub const SIZE: usize = 40;

    /// Append the 40-byte header to `buf`, padding included
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&FRAME_MAGIC);
        buf.extend_from_slice(&self.time_ns.to_le_bytes());
        buf.extend_from_slice(&self.flags.bits().to_le_bytes());
        buf.extend_from_slice(&self.skeleton_id.to_le_bytes());
        buf.extend_from_slice(&[0u8; 2]);
        for c in self.root_position {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        buf.extend_from_slice(&[0u8; 4]);
    }
}

/// Size of a packed rotation record
pub const PACKED_ROTATION_SIZE: usize = 4;

/// Size of a plain rotation record
pub const ROTATION_SIZE: usize = 16;

/// Append a 4-byte packed rotation record
pub fn write_packed_rotation(buf: &mut Vec<u8>, packed: u32) {
    buf.extend_from_slice(&packed.to_le_bytes());
}

/// Append a 16-byte plain rotation record (x, y, z, w)
pub fn write_rotation(buf: &mut Vec<u8>, rotation: [f32; 4]) {
    for c in rotation {
        buf.extend_from_slice(&c.to_le_bytes());
    }
}

/// Total size of a skeleton packet for `joint_count` joints
pub fn skeleton_packet_size(joint_count: usize) -> usize {
    SkeletonHeader::SIZE + joint_count * JointDefinition::SIZE
}

/// Total size of a frame packet for `joint_count` joints
pub fn frame_packet_size(joint_count: usize, packed: bool) -> usize {
    let record = if packed {
        PACKED_ROTATION_SIZE
    } else {
        ROTATION_SIZE
    };
    FrameHeader::SIZE + joint_count * record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_header_size() {
        let mut buf = Vec::new();
        let header = SkeletonHeader {
            skeleton_id: 1,
            joint_count: 2,
            flags: SkeletonFlags::empty(),
        };
        header.write_to(&mut buf);
        assert_eq!(buf.len(), SkeletonHeader::SIZE);
    }

    #[test]
    fn test_skeleton_header_layout() {
        let mut buf = Vec::new();
        let header = SkeletonHeader {
            skeleton_id: 0x1234,
            joint_count: 0x0056,
            flags: SkeletonFlags::HAS_INITIAL_ROTATION,
        };
        header.write_to(&mut buf);
        assert_eq!(&buf[0..8], b"SRHTSKL1");
        assert_eq!(&buf[8..10], &[0x34, 0x12]);
        assert_eq!(&buf[10..12], &[0x56, 0x00]);
        assert_eq!(&buf[12..16], &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_joint_definition_size() {
        let mut buf = Vec::new();
        let def = JointDefinition {
            parent: ROOT_PARENT,
            bone: 0,
            offset: [0.0, 0.0, 0.0],
        };
        def.write_to(&mut buf);
        assert_eq!(buf.len(), JointDefinition::SIZE);
    }

    #[test]
    fn test_joint_definition_layout() {
        let mut buf = Vec::new();
        let def = JointDefinition {
            parent: ROOT_PARENT,
            bone: 1,
            offset: [0.0, 1.0, 0.0],
        };
        def.write_to(&mut buf);
        assert_eq!(&buf[0..2], &[0xFF, 0xFF]);
        assert_eq!(&buf[2..4], &[0x01, 0x00]);
        assert_eq!(&buf[4..8], &0.0f32.to_le_bytes());
        assert_eq!(&buf[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&buf[12..16], &0.0f32.to_le_bytes());
    }

    #[test]
    fn test_frame_header_size() {
        let mut buf = Vec::new();
        let header = FrameHeader {
            time_ns: 0,
            flags: FrameFlags::empty(),
            skeleton_id: 0,
            root_position: [0.0, 0.0, 0.0],
        };
        header.write_to(&mut buf);
        assert_eq!(buf.len(), FrameHeader::SIZE);
    }

    #[test]
    fn test_frame_header_layout() {
        let mut buf = Vec::new();
        let header = FrameHeader {
            time_ns: 0x0102030405060708,
            flags: FrameFlags::QUAT32,
            skeleton_id: 0xBEEF,
            root_position: [1.0, 2.0, 3.0],
        };
        header.write_to(&mut buf);
        assert_eq!(&buf[0..8], b"SRHTFRM1");
        assert_eq!(
            &buf[8..16],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(&buf[16..20], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&buf[20..22], &[0xEF, 0xBE]);
        // padding after skeleton_id
        assert_eq!(&buf[22..24], &[0x00, 0x00]);
        assert_eq!(&buf[24..28], &1.0f32.to_le_bytes());
        assert_eq!(&buf[28..32], &2.0f32.to_le_bytes());
        assert_eq!(&buf[32..36], &3.0f32.to_le_bytes());
        // tail padding
        assert_eq!(&buf[36..40], &[0x00; 4]);
    }

    #[test]
    fn test_rotation_record_sizes() {
        let mut buf = Vec::new();
        write_packed_rotation(&mut buf, 0xDEADBEEF);
        assert_eq!(buf.len(), PACKED_ROTATION_SIZE);
        assert_eq!(&buf[..], &[0xEF, 0xBE, 0xAD, 0xDE]);

        buf.clear();
        write_rotation(&mut buf, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(buf.len(), ROTATION_SIZE);
        assert_eq!(&buf[12..16], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_packet_sizes() {
        assert_eq!(skeleton_packet_size(2), 48);
        assert_eq!(frame_packet_size(2, false), 72);
        assert_eq!(frame_packet_size(2, true), 48);
        assert_eq!(frame_packet_size(0, true), FrameHeader::SIZE);
    }
}

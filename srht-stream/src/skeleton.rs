//! Skeleton data model
//!
//! Immutable per-skeleton description: an ordered joint list (pre-order,
//! parents before children) with bind offsets, humanoid bone tags, and the
//! animation channels each joint is driven by. Produced by a motion-capture
//! parser (external to this crate) and consumed by the hierarchy solver and
//! the stream sender.

use glam::Vec3;
use smallvec::SmallVec;

/// Semantic humanoid bone tag carried in [`JointDefinition`] records.
///
/// Wire values are fixed by the SRHT protocol; `Unknown` is 0 and the named
/// bones follow in protocol order. Joints that do not map onto a humanoid
/// rig stay `Unknown`.
///
/// [`JointDefinition`]: srht_protocol::wire::JointDefinition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u16)]
pub enum HumanoidBone {
    #[default]
    Unknown = 0,
    // body
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    // legs
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    LeftToes,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    RightToes,
    // arms
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    // fingers
    LeftThumbMetacarpal,
    LeftThumbProximal,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbMetacarpal,
    RightThumbProximal,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
}

impl HumanoidBone {
    /// Wire value for [`JointDefinition::bone`]
    ///
    /// [`JointDefinition::bone`]: srht_protocol::wire::JointDefinition
    pub fn to_wire(self) -> u16 {
        self as u16
    }

    /// Display name, used by bone-assignment UI
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Hips => "Hips",
            Self::Spine => "Spine",
            Self::Chest => "Chest",
            Self::UpperChest => "UpperChest",
            Self::Neck => "Neck",
            Self::Head => "Head",
            Self::LeftUpperLeg => "LeftUpperLeg",
            Self::LeftLowerLeg => "LeftLowerLeg",
            Self::LeftFoot => "LeftFoot",
            Self::LeftToes => "LeftToes",
            Self::RightUpperLeg => "RightUpperLeg",
            Self::RightLowerLeg => "RightLowerLeg",
            Self::RightFoot => "RightFoot",
            Self::RightToes => "RightToes",
            Self::LeftShoulder => "LeftShoulder",
            Self::LeftUpperArm => "LeftUpperArm",
            Self::LeftLowerArm => "LeftLowerArm",
            Self::LeftHand => "LeftHand",
            Self::RightShoulder => "RightShoulder",
            Self::RightUpperArm => "RightUpperArm",
            Self::RightLowerArm => "RightLowerArm",
            Self::RightHand => "RightHand",
            Self::LeftThumbMetacarpal => "LeftThumbMetacarpal",
            Self::LeftThumbProximal => "LeftThumbProximal",
            Self::LeftThumbDistal => "LeftThumbDistal",
            Self::LeftIndexProximal => "LeftIndexProximal",
            Self::LeftIndexIntermediate => "LeftIndexIntermediate",
            Self::LeftIndexDistal => "LeftIndexDistal",
            Self::LeftMiddleProximal => "LeftMiddleProximal",
            Self::LeftMiddleIntermediate => "LeftMiddleIntermediate",
            Self::LeftMiddleDistal => "LeftMiddleDistal",
            Self::LeftRingProximal => "LeftRingProximal",
            Self::LeftRingIntermediate => "LeftRingIntermediate",
            Self::LeftRingDistal => "LeftRingDistal",
            Self::LeftLittleProximal => "LeftLittleProximal",
            Self::LeftLittleIntermediate => "LeftLittleIntermediate",
            Self::LeftLittleDistal => "LeftLittleDistal",
            Self::RightThumbMetacarpal => "RightThumbMetacarpal",
            Self::RightThumbProximal => "RightThumbProximal",
            Self::RightThumbDistal => "RightThumbDistal",
            Self::RightIndexProximal => "RightIndexProximal",
            Self::RightIndexIntermediate => "RightIndexIntermediate",
            Self::RightIndexDistal => "RightIndexDistal",
            Self::RightMiddleProximal => "RightMiddleProximal",
            Self::RightMiddleIntermediate => "RightMiddleIntermediate",
            Self::RightMiddleDistal => "RightMiddleDistal",
            Self::RightRingProximal => "RightRingProximal",
            Self::RightRingIntermediate => "RightRingIntermediate",
            Self::RightRingDistal => "RightRingDistal",
            Self::RightLittleProximal => "RightLittleProximal",
            Self::RightLittleIntermediate => "RightLittleIntermediate",
            Self::RightLittleDistal => "RightLittleDistal",
        }
    }
}

/// One animation channel: a translation or rotation degree of freedom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    XPosition,
    YPosition,
    ZPosition,
    XRotation,
    YRotation,
    ZRotation,
}

impl Channel {
    pub fn is_position(self) -> bool {
        matches!(self, Self::XPosition | Self::YPosition | Self::ZPosition)
    }

    pub fn is_rotation(self) -> bool {
        !self.is_position()
    }

    /// Short code for logs ("Xp", "Yr", ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XPosition => "Xp",
            Self::YPosition => "Yp",
            Self::ZPosition => "Zp",
            Self::XRotation => "Xr",
            Self::YRotation => "Yr",
            Self::ZRotation => "Zr",
        }
    }
}

/// Ordered channel list for one joint
///
/// `start_index` is the joint's offset into a frame's flat value array;
/// the channels consume consecutive values from there, in list order.
#[derive(Debug, Clone, Default)]
pub struct Channels {
    pub start_index: usize,
    pub types: SmallVec<[Channel; 6]>,
}

impl Channels {
    pub fn new(start_index: usize, types: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            start_index,
            types: types.into_iter().collect(),
        }
    }

    /// Number of frame values this joint consumes
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One joint of a parsed motion-capture hierarchy
#[derive(Debug, Clone)]
pub struct Joint {
    /// Position in the skeleton's joint list (0 = root)
    pub index: u16,
    /// Parent joint index, `None` for the root
    pub parent: Option<u16>,
    /// Display name from the source file
    pub name: String,
    /// Humanoid bone assignment
    pub bone: HumanoidBone,
    /// Bind-pose translation from the parent, in source units
    pub offset: Vec3,
    /// Channels driven by the animation curve
    pub channels: Channels,
}

/// A parsed skeletal hierarchy
///
/// Joints are stored in pre-order: a joint's parent always appears earlier
/// in the list, and index 0 is the root. The same order defines the record
/// order of every SRHT packet built from this skeleton.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: u16,
    pub joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new(id: u16, joints: Vec<Joint>) -> Self {
        Self { id, joints }
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Estimate the factor converting source units to meters.
    ///
    /// Motion-capture files rarely declare their length unit. Bind offsets
    /// of a humanoid in meters stay well under 2.5 per axis; centimeter
    /// data puts limb offsets in the tens.
    pub fn guess_scaling(&self) -> f32 {
        let max = self
            .joints
            .iter()
            .map(|j| j.offset.abs().max_element())
            .fold(0.0f32, f32::max);
        if max >= 2.5 { 0.01 } else { 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(index: u16, parent: Option<u16>, offset: Vec3) -> Joint {
        Joint {
            index,
            parent,
            name: format!("joint{}", index),
            bone: HumanoidBone::Unknown,
            offset,
            channels: Channels::default(),
        }
    }

    #[test]
    fn test_bone_wire_values() {
        assert_eq!(HumanoidBone::Unknown.to_wire(), 0);
        assert_eq!(HumanoidBone::Hips.to_wire(), 1);
        assert_eq!(HumanoidBone::Head.to_wire(), 6);
        assert_eq!(HumanoidBone::LeftUpperLeg.to_wire(), 7);
        assert_eq!(HumanoidBone::RightHand.to_wire(), 22);
        assert_eq!(HumanoidBone::LeftThumbMetacarpal.to_wire(), 23);
        assert_eq!(HumanoidBone::LeftLittleDistal.to_wire(), 37);
        assert_eq!(HumanoidBone::RightThumbMetacarpal.to_wire(), 38);
        assert_eq!(HumanoidBone::RightLittleDistal.to_wire(), 52);
    }

    #[test]
    fn test_channels_len() {
        let ch = Channels::new(
            0,
            [
                Channel::XPosition,
                Channel::YPosition,
                Channel::ZPosition,
                Channel::ZRotation,
                Channel::XRotation,
                Channel::YRotation,
            ],
        );
        assert_eq!(ch.len(), 6);
        assert!(ch.types[0].is_position());
        assert!(ch.types[5].is_rotation());
    }

    #[test]
    fn test_guess_scaling_meters() {
        let skeleton = Skeleton::new(
            0,
            vec![
                joint(0, None, Vec3::ZERO),
                joint(1, Some(0), Vec3::new(0.0, 0.45, 0.0)),
            ],
        );
        assert_eq!(skeleton.guess_scaling(), 1.0);
    }

    #[test]
    fn test_guess_scaling_centimeters() {
        let skeleton = Skeleton::new(
            0,
            vec![
                joint(0, None, Vec3::ZERO),
                joint(1, Some(0), Vec3::new(0.0, 45.0, 0.0)),
            ],
        );
        assert_eq!(skeleton.guess_scaling(), 0.01);
    }
}

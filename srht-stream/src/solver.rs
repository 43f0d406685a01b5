//! Hierarchy resolution (forward kinematics)
//!
//! Turns a [`Skeleton`] plus one animation [`Frame`] into a flat array of
//! world matrices, one per joint, by pre-order traversal from the root.
//! The joint tree is an arena of nodes indexed by joint index; parent and
//! child links are indices, so the topology cannot form cycles and carries
//! no reference counting.

use glam::Mat4;

use crate::frame::Frame;
use crate::skeleton::{Channels, Skeleton};

/// Hierarchy construction and resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    #[error("skeleton has no joints")]
    EmptySkeleton,
    #[error("joint 0 must be the root, but has a parent")]
    RootHasParent,
    #[error("joint {index} has no parent but is not joint 0")]
    MultipleRoots { index: u16 },
    #[error("joint {index} references parent {parent}, which does not precede it")]
    ParentOutOfOrder { index: u16, parent: u16 },
    #[error("joint {index} sits at position {position} in the joint list")]
    IndexMismatch { index: u16, position: u16 },
    #[error("output slice holds {got} matrices, skeleton has {expected} joints")]
    OutputLengthMismatch { expected: usize, got: usize },
}

/// One joint's static solver state
#[derive(Debug)]
struct Node {
    channels: Channels,
    /// Bind-pose local transform: translation from the parent, scaled
    shape: Mat4,
    children: Vec<u16>,
}

/// Forward-kinematics solver for one skeleton
///
/// Built once per skeleton; the topology is immutable afterwards. Each call
/// to [`resolve_frame`] fills a caller-supplied matrix slice, so the output
/// lifetime is the caller's concern and consecutive resolves never alias.
///
/// [`resolve_frame`]: HierarchySolver::resolve_frame
#[derive(Debug)]
pub struct HierarchySolver {
    nodes: Vec<Node>,
    scaling: f32,
}

impl HierarchySolver {
    /// Build the joint tree for `skeleton`.
    ///
    /// `scaling` converts source units to output units and is applied to
    /// every bind offset and channel translation. The skeleton must be in
    /// pre-order with each joint's index equal to its list position: joint
    /// 0 is the root and every other joint's parent precedes it.
    pub fn new(skeleton: &Skeleton, scaling: f32) -> Result<Self, SolverError> {
        if skeleton.joints.is_empty() {
            return Err(SolverError::EmptySkeleton);
        }

        let mut nodes = Vec::with_capacity(skeleton.joints.len());
        for (position, joint) in skeleton.joints.iter().enumerate() {
            if joint.index as usize != position {
                return Err(SolverError::IndexMismatch {
                    index: joint.index,
                    position: position as u16,
                });
            }
            match (joint.index, joint.parent) {
                (0, Some(_)) => return Err(SolverError::RootHasParent),
                (0, None) => {}
                (index, None) => return Err(SolverError::MultipleRoots { index }),
                (index, Some(parent)) if parent >= index => {
                    return Err(SolverError::ParentOutOfOrder { index, parent });
                }
                (_, Some(_)) => {}
            }
            nodes.push(Node {
                channels: joint.channels.clone(),
                shape: Mat4::from_translation(joint.offset * scaling),
                children: Vec::new(),
            });
        }

        for joint in &skeleton.joints {
            if let Some(parent) = joint.parent {
                nodes[parent as usize].children.push(joint.index);
            }
        }

        Ok(Self { nodes, scaling })
    }

    pub fn joint_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    /// Compute world matrices for one frame.
    ///
    /// Pre-order depth-first traversal from the root: each node's world
    /// matrix is `parent_world * shape * local`, where `local` is the
    /// node's animated rotation and translation for this frame. Matrices
    /// land in `out` in traversal order, a parent's always before any of
    /// its children's. `out` must hold exactly one matrix per joint.
    pub fn resolve_frame(&self, frame: &Frame, out: &mut [Mat4]) -> Result<(), SolverError> {
        if out.len() != self.nodes.len() {
            return Err(SolverError::OutputLengthMismatch {
                expected: self.nodes.len(),
                got: out.len(),
            });
        }

        let mut cursor = 0;
        self.walk(0, Mat4::IDENTITY, frame, out, &mut cursor);
        debug_assert_eq!(cursor, out.len());
        Ok(())
    }

    fn walk(&self, index: u16, parent: Mat4, frame: &Frame, out: &mut [Mat4], cursor: &mut usize) {
        let node = &self.nodes[index as usize];
        let (pos, rot) = frame.resolve(&node.channels);
        let local = Mat4::from_translation(pos * self.scaling) * Mat4::from_mat3(rot);
        let world = parent * node.shape * local;

        out[*cursor] = world;
        *cursor += 1;

        for &child in &node.children {
            self.walk(child, world, frame, out, cursor);
        }
    }
}

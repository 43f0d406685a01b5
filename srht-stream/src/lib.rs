//! Motion-capture skeleton streaming over SRHT/UDP
//!
//! Takes a parsed skeletal hierarchy and sampled animation frames,
//! resolves per-joint world transforms by forward kinematics, and streams
//! skeleton definitions and per-frame poses to a consumer (an avatar
//! renderer, typically) as SRHT datagrams.
//!
//! - [`skeleton`] / [`frame`] — the joint hierarchy and animation sample
//!   data model handed in by a motion-capture parser
//! - [`solver`] — forward kinematics: joint tree + frame -> world matrices
//! - [`sender`] — pooled, fire-and-forget UDP packet sender
//!
//! Wire layout and rotation compression live in the `srht-protocol` crate.
//!
//! # Example
//!
//! ```no_run
//! use srht_stream::{Frame, HierarchySolver, StreamSender};
//! # fn demo(skeleton: srht_stream::Skeleton, frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
//! let target = "127.0.0.1:54345".parse()?;
//! let sender = StreamSender::bind()?;
//! sender.send_skeleton(target, &skeleton)?;
//!
//! let solver = HierarchySolver::new(&skeleton, skeleton.guess_scaling())?;
//! let mut world = vec![glam::Mat4::IDENTITY; skeleton.joint_count()];
//! solver.resolve_frame(&frame, &mut world)?; // feed the renderer
//! sender.send_frame(target, &skeleton, &frame, true)?;
//! # Ok(())
//! # }
//! ```

pub mod frame;
pub mod sender;
pub mod skeleton;
pub mod solver;

pub use frame::Frame;
pub use sender::{SendError, StreamSender};
pub use skeleton::{Channel, Channels, HumanoidBone, Joint, Skeleton};
pub use solver::{HierarchySolver, SolverError};

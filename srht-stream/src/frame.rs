//! Animation frame sampling
//!
//! A [`Frame`] is one sample of an animation: a timestamp plus the flat
//! channel value array for that sample, borrowed from the animation source.
//! [`Frame::resolve`] maps a joint's channel list to the joint's local
//! translation and rotation for the sample.

use std::time::Duration;

use glam::{Mat3, Vec3};

use crate::skeleton::{Channel, Channels};

/// One animation sample
///
/// `values` holds every joint's channel values for this sample,
/// concatenated in skeleton joint order; each joint's [`Channels`] records
/// its start index into the array. The slice must cover every joint's
/// channel range of the skeleton the frame was sampled for.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Sample number within the animation
    pub index: usize,
    /// Time of this sample from animation start
    pub time: Duration,
    /// Flat channel values for the whole skeleton
    pub values: &'a [f32],
}

impl<'a> Frame<'a> {
    pub fn new(index: usize, time: Duration, values: &'a [f32]) -> Self {
        Self {
            index,
            time,
            values,
        }
    }

    /// Sample timestamp in nanoseconds, as carried in a frame packet header
    pub fn time_ns(&self) -> i64 {
        self.time.as_nanos() as i64
    }

    /// Resolve one joint's local translation and rotation.
    ///
    /// Position channels fill the translation components they drive (zero
    /// where undriven, in source units). Rotation channels are degrees
    /// about the joint's local axes, composed in listed order with the
    /// first channel outermost.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not cover the joint's channel range, i.e.
    /// the frame was sampled for a different skeleton than `channels`
    /// belongs to.
    pub fn resolve(&self, channels: &Channels) -> (Vec3, Mat3) {
        let mut pos = Vec3::ZERO;
        let mut rot = Mat3::IDENTITY;

        for (i, channel) in channels.types.iter().enumerate() {
            let value = self.values[channels.start_index + i];
            match channel {
                Channel::XPosition => pos.x = value,
                Channel::YPosition => pos.y = value,
                Channel::ZPosition => pos.z = value,
                Channel::XRotation => rot *= Mat3::from_rotation_x(value.to_radians()),
                Channel::YRotation => rot *= Mat3::from_rotation_y(value.to_radians()),
                Channel::ZRotation => rot *= Mat3::from_rotation_z(value.to_radians()),
            }
        }

        (pos, rot)
    }
}

//! SRHT protocol data layer
//!
//! Pure encode-side building blocks for the SRHT skeleton/pose streaming
//! protocol: the [`quat32`] smallest-three quaternion codec and the
//! [`wire`] packet layouts. No I/O and no allocation beyond the caller's
//! buffers; the transport lives in the `srht-stream` crate.

pub mod quat32;
pub mod wire;

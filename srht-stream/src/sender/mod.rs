//! SRHT UDP stream sender
//!
//! Serializes skeleton and frame packets into pooled buffers and ships
//! them as single UDP datagrams, fire and forget: no retries, no
//! acknowledgements, no ordering beyond the order of submission. A dropped
//! or stale frame is preferable to the latency of reliable delivery.
//!
//! Packet assembly happens on the caller's thread; the blocking socket
//! write runs on a dedicated I/O thread fed through a bounded channel.
//! Completion of a send, successful or not, returns its buffer to the
//! pool. When the pool or the queue is saturated the packet is dropped and
//! logged instead of blocking the producer.

mod payload;

pub use payload::Payload;

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::mpsc::{self, TrySendError};
use std::thread::JoinHandle;

use glam::Quat;

use srht_protocol::{quat32, wire};

use crate::frame::Frame;
use crate::skeleton::Skeleton;
use payload::PayloadPool;

/// Practical single-datagram payload ceiling (typical Ethernet MTU minus
/// IP and UDP headers). SRHT does not fragment; larger packets are
/// rejected.
pub const MAX_DATAGRAM_SIZE: usize = 1472;

/// Upper bound on simultaneously in-flight payload buffers
const POOL_CAPACITY: usize = 8;

/// Stream sender errors
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("failed to bind UDP socket")]
    Bind(#[from] std::io::Error),
    #[error("packet of {size} bytes exceeds the {MAX_DATAGRAM_SIZE}-byte datagram ceiling")]
    PacketTooLarge { size: usize },
    #[error("skeleton has no joints, a frame packet needs a root")]
    EmptySkeleton,
}

/// One packet handed to the I/O thread
struct Outbound {
    target: SocketAddr,
    payload: Payload,
}

/// Pooled, asynchronous SRHT packet sender
///
/// Owns one UDP socket on an ephemeral local port and a bounded pool of
/// reusable send buffers. [`send_skeleton`] and [`send_frame`] serialize on
/// the calling thread and return immediately; the datagram goes out on the
/// sender's I/O thread. Dropping the sender drains the queue and joins the
/// thread.
///
/// [`send_skeleton`]: StreamSender::send_skeleton
/// [`send_frame`]: StreamSender::send_frame
pub struct StreamSender {
    pool: Arc<PayloadPool>,
    submit: Option<mpsc::SyncSender<Outbound>>,
    local_addr: SocketAddr,
    io_thread: Option<JoinHandle<()>>,
}

impl StreamSender {
    /// Bind an outbound socket on an ephemeral port and start the I/O
    /// thread.
    pub fn bind() -> Result<Self, SendError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(SendError::Bind)?;
        let local_addr = socket.local_addr().map_err(SendError::Bind)?;

        tracing::debug!(port = local_addr.port(), "StreamSender bound");

        let pool = Arc::new(PayloadPool::new(POOL_CAPACITY));
        let (submit, rx) = mpsc::sync_channel::<Outbound>(POOL_CAPACITY);

        let io_pool = Arc::clone(&pool);
        let io_thread = std::thread::spawn(move || io_loop(socket, rx, io_pool));

        Ok(Self {
            pool,
            submit: Some(submit),
            local_addr,
            io_thread: Some(io_thread),
        })
    }

    /// Local address of the outbound socket
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a skeleton packet to `target`.
    ///
    /// Joint offsets are scaled by the skeleton's unit-scale estimate.
    /// Idempotent on the wire: the packet can be retransmitted whenever
    /// the receiver may have missed it.
    pub fn send_skeleton(&self, target: SocketAddr, skeleton: &Skeleton) -> Result<(), SendError> {
        let size = wire::skeleton_packet_size(skeleton.joint_count());
        if size > MAX_DATAGRAM_SIZE {
            return Err(SendError::PacketTooLarge { size });
        }

        let Some(mut payload) = self.pool.try_acquire() else {
            tracing::warn!("payload pool exhausted, dropping skeleton packet");
            return Ok(());
        };
        payload.set_skeleton(skeleton, skeleton.guess_scaling());
        self.submit(target, payload);
        Ok(())
    }

    /// Send one frame packet to `target`.
    ///
    /// Resolves every joint's rotation from the frame's channel data, in
    /// skeleton joint order; the root joint also supplies the header
    /// timestamp and root position. With `pack` set, rotations go out as
    /// 4-byte packed quaternions, otherwise as plain 16-byte quaternions.
    /// A skeleton without joints has no root to anchor the header and is
    /// rejected.
    pub fn send_frame(
        &self,
        target: SocketAddr,
        skeleton: &Skeleton,
        frame: &Frame,
        pack: bool,
    ) -> Result<(), SendError> {
        if skeleton.joints.is_empty() {
            return Err(SendError::EmptySkeleton);
        }
        let size = wire::frame_packet_size(skeleton.joint_count(), pack);
        if size > MAX_DATAGRAM_SIZE {
            return Err(SendError::PacketTooLarge { size });
        }

        let Some(mut payload) = self.pool.try_acquire() else {
            tracing::warn!(frame = frame.index, "payload pool exhausted, dropping frame packet");
            return Ok(());
        };

        let scaling = skeleton.guess_scaling();
        for (i, joint) in skeleton.joints.iter().enumerate() {
            let (pos, rot) = frame.resolve(&joint.channels);
            let rotation = Quat::from_mat3(&rot);

            // The first joint anchors the packet: its resolve drives the
            // header timestamp and root position, which also resets the
            // recycled buffer before any rotation record lands.
            if i == 0 {
                payload.set_frame(skeleton.id, frame.time_ns(), (pos * scaling).to_array(), pack);
            }
            if pack {
                payload.push_packed(quat32::pack(rotation.x, rotation.y, rotation.z, rotation.w));
            } else {
                payload.push_rotation([rotation.x, rotation.y, rotation.z, rotation.w]);
            }
        }

        self.submit(target, payload);
        Ok(())
    }

    /// Hand a finished packet to the I/O thread, reclaiming the buffer if
    /// the queue is saturated.
    fn submit(&self, target: SocketAddr, payload: Payload) {
        // The channel is only taken in Drop
        let Some(submit) = &self.submit else {
            self.pool.release(payload);
            return;
        };
        match submit.try_send(Outbound { target, payload }) {
            Ok(()) => {}
            Err(TrySendError::Full(outbound)) => {
                tracing::warn!("send queue full, dropping packet");
                self.pool.release(outbound.payload);
            }
            Err(TrySendError::Disconnected(outbound)) => {
                tracing::warn!("I/O thread gone, dropping packet");
                self.pool.release(outbound.payload);
            }
        }
    }
}

impl Drop for StreamSender {
    fn drop(&mut self) {
        // Closing the channel stops the I/O loop once the queue drains
        self.submit.take();
        if let Some(handle) = self.io_thread.take() {
            let _ = handle.join();
        }
    }
}

/// I/O thread body: send each queued packet, then recycle its buffer.
///
/// Send failures are logged and otherwise ignored; the buffer returns to
/// the pool on every path.
fn io_loop(socket: UdpSocket, rx: mpsc::Receiver<Outbound>, pool: Arc<PayloadPool>) {
    for Outbound { target, payload } in rx.iter() {
        match socket.send_to(payload.bytes(), target) {
            Ok(bytes) => tracing::trace!(bytes, %target, "sent SRHT packet"),
            Err(e) => tracing::warn!(error = %e, %target, "SRHT send failed"),
        }
        pool.release(payload);
    }
    tracing::debug!("StreamSender I/O thread exiting");
}

//! # Game Events
//!
//! The typed events both peers exchange, and their binary encoding.
//!
//! Every event is a variant of the closed [`Event`] sum type. Adding a new
//! kind means adding a variant, a tag constant, and arms in the encode and
//! decode paths — a compile-time-checked change on both peers.
//!
//! ## Payload Format
//! ```text
//! [Tag(1)] [Fields(N)]
//! ```
//! Numeric fields are fixed-width big-endian IEEE-754, so both peers read
//! identical values regardless of platform or locale.

use crate::error::{NetError, Result};

/// Wire tag for [`Event::BallSetup`].
pub const TAG_BALL_SETUP: u8 = 0x01;

/// Wire tag for [`Event::Goal`].
pub const TAG_GOAL: u8 = 0x02;

/// Frame header size: a 4-byte big-endian payload length.
pub const HEADER_LEN: usize = 4;

/// Max allowed payload size for a single frame.
/// Game events are tiny; anything near this limit is a corrupt or hostile stream.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Discriminant of an [`Event`], used as the dispatch key for subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A ball entering play.
    BallSetup,
    /// A goal was scored.
    Goal,
}

impl EventKind {
    /// Wire tag byte for this kind.
    pub fn tag(self) -> u8 {
        match self {
            EventKind::BallSetup => TAG_BALL_SETUP,
            EventKind::Goal => TAG_GOAL,
        }
    }

    /// Resolve a wire tag back to a kind. Returns `None` for unknown tags.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_BALL_SETUP => Some(EventKind::BallSetup),
            TAG_GOAL => Some(EventKind::Goal),
            _ => None,
        }
    }

    /// Human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::BallSetup => "ball_setup",
            EventKind::Goal => "goal",
        }
    }
}

/// A typed game event. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A new ball entering play at the given playfield position.
    BallSetup { x: f32, y: f32 },
    /// A goal was scored. Marker event, no fields.
    Goal,
}

impl Event {
    /// The kind this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::BallSetup { .. } => EventKind::BallSetup,
            Event::Goal => EventKind::Goal,
        }
    }

    /// Serialize the tag and fields. Total: every representable event
    /// produces bytes.
    pub fn to_payload(&self) -> Vec<u8> {
        match *self {
            Event::BallSetup { x, y } => {
                let mut payload = Vec::with_capacity(9);
                payload.push(TAG_BALL_SETUP);
                payload.extend_from_slice(&x.to_be_bytes());
                payload.extend_from_slice(&y.to_be_bytes());
                payload
            }
            Event::Goal => vec![TAG_GOAL],
        }
    }

    /// Decode the tag and fields of exactly one event.
    ///
    /// An unknown tag or a field-length mismatch is a
    /// [`NetError::MalformedFrame`]; the stream is no longer trustworthy and
    /// the connection should be closed rather than resynchronized.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let (&tag, fields) = payload
            .split_first()
            .ok_or_else(|| NetError::MalformedFrame("empty payload".to_string()))?;

        match tag {
            TAG_BALL_SETUP => {
                if fields.len() != 8 {
                    return Err(NetError::MalformedFrame(format!(
                        "ball setup expects 8 field bytes, got {}",
                        fields.len()
                    )));
                }
                Ok(Event::BallSetup {
                    x: read_f32_be(&fields[0..4]),
                    y: read_f32_be(&fields[4..8]),
                })
            }
            TAG_GOAL => {
                if !fields.is_empty() {
                    return Err(NetError::MalformedFrame(format!(
                        "goal carries no fields, got {} bytes",
                        fields.len()
                    )));
                }
                Ok(Event::Goal)
            }
            tag => Err(NetError::MalformedFrame(format!(
                "unknown event tag {tag:#04x}"
            ))),
        }
    }

    /// Serialize one complete frame: length prefix plus payload.
    pub fn to_frame(&self) -> Vec<u8> {
        let payload = self.to_payload();
        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&payload);
        frame
    }

    /// Decode one frame from the front of `buf`, returning the event and
    /// the number of bytes consumed.
    ///
    /// Returns [`NetError::TruncatedFrame`] when the buffer holds fewer
    /// bytes than the header declares — buffer and retry once more arrive.
    pub fn decode_frame(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < HEADER_LEN {
            return Err(NetError::TruncatedFrame {
                needed: HEADER_LEN,
                available: buf.len(),
            });
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&buf[..HEADER_LEN]);
        let len = u32::from_be_bytes(len_bytes) as usize;

        if len > MAX_FRAME_SIZE {
            return Err(NetError::OversizedFrame(len));
        }

        let total = HEADER_LEN + len;
        if buf.len() < total {
            return Err(NetError::TruncatedFrame {
                needed: total,
                available: buf.len(),
            });
        }

        let event = Self::from_payload(&buf[HEADER_LEN..total])?;
        Ok((event, total))
    }
}

fn read_f32_be(bytes: &[u8]) -> f32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[..4]);
    f32::from_be_bytes(b)
}

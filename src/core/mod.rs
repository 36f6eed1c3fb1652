//! # Core Wire Components
//!
//! Event definitions, binary payload encoding, and the framing codec.
//!
//! This module is the foundation of the protocol: it fixes the byte-level
//! representation both peers must agree on at build time. There is no
//! runtime schema exchange — the event set is a closed enumeration.
//!
//! ## Components
//! - **Event**: Typed game events with a fixed-width binary encoding
//! - **Codec**: Tokio codec for length-delimited framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Length(4, BE)] [Tag(1)] [Fields(N)]
//! ```
//!
//! ## Safety
//! - Maximum frame size: 64 KiB (length is validated before allocation)
//! - Unknown tags are rejected, never silently skipped

pub mod codec;
pub mod event;

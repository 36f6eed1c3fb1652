//! # Event Codec
//!
//! Tokio codec for framing [`Event`]s over a byte stream.
//!
//! TCP delivers bytes, not messages: a single read may contain several
//! frames, or a fraction of one. The codec re-enters decode on the
//! accumulated buffer until it runs dry, preserving write order, and maps
//! the truncation signal to `Ok(None)` so the framed stream simply waits
//! for more bytes.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::event::{Event, HEADER_LEN};
use crate::error::NetError;

/// Length-delimited event codec. Each frame carries exactly one event;
/// frames never span or merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventCodec;

impl Decoder for EventCodec {
    type Item = Event;
    type Error = NetError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>, NetError> {
        match Event::decode_frame(src) {
            Ok((event, consumed)) => {
                src.advance(consumed);
                Ok(Some(event))
            }
            Err(NetError::TruncatedFrame { needed, available }) => {
                // Partial frame: keep the buffered bytes and reserve what
                // the header promised.
                src.reserve(needed - available);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Encoder<Event> for EventCodec {
    type Error = NetError;

    fn encode(&mut self, event: Event, dst: &mut BytesMut) -> Result<(), NetError> {
        let payload = event.to_payload();
        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.put_slice(&payload);
        Ok(())
    }
}

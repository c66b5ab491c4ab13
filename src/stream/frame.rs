//! Server-Sent Events framing: `data: <json>\n\n` per event

use crate::stream::types::{StreamError, StreamResult};
use bytes::Bytes;
use serde::Serialize;

pub const DATA_PREFIX: &[u8] = b"data: ";
pub const FRAME_TERMINATOR: &[u8] = b"\n\n";

/// Serialize event `index` into one complete frame.
///
/// Compact JSON never contains a raw newline, so each payload fits on the
/// single `data:` line.
pub fn encode_frame<E: Serialize + ?Sized>(index: usize, event: &E) -> StreamResult<Bytes> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(DATA_PREFIX);
    serde_json::to_writer(&mut buf, event)
        .map_err(|source| StreamError::EventEncode { index, source })?;
    buf.extend_from_slice(FRAME_TERMINATOR);
    Ok(Bytes::from(buf))
}

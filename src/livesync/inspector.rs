//! Chrome-DevTools-Protocol framing for the iOS inspector channel.
//!
//! Each frame is a 4-byte big-endian payload byte length followed by
//! the payload encoded as UTF-16-LE. The framing must match the
//! on-device inspector exactly.

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// The inspector listens here once forwarded to the local host
pub const INSPECTOR_PORT: u16 = 18181;

/// Encode one wire frame.
pub fn encode_frame(payload: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() * 2);
    for unit in payload.encode_utf16() {
        body.extend_from_slice(&unit.to_le_bytes());
    }
    let mut frame = Vec::with_capacity(body.len() + 4);
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    frame
}

/// Decode one frame from the front of `bytes`; returns the payload and
/// the number of bytes consumed, or None if a full frame is not there
/// yet.
pub fn decode_frame(bytes: &[u8]) -> Option<(String, usize)> {
    if bytes.len() < 4 {
        return None;
    }
    let len = u32::from_be_bytes(bytes[0..4].try_into().ok()?) as usize;
    if len % 2 != 0 || bytes.len() < 4 + len {
        return None;
    }
    let units: Vec<u16> = bytes[4..4 + len]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    Some((String::from_utf16_lossy(&units), 4 + len))
}

/// `Debugger.setScriptSource` message for one patched script.
pub fn set_script_source(id: u64, script_url: &str, source: &str) -> String {
    serde_json::json!({
        "id": id,
        "method": "Debugger.setScriptSource",
        "params": { "scriptUrl": script_url, "scriptSource": source }
    })
    .to_string()
}

/// `Page.reload` message ending a live-edit burst.
pub fn page_reload(id: u64) -> String {
    serde_json::json!({
        "id": id,
        "method": "Page.reload",
        "params": { "ignoreCache": true }
    })
    .to_string()
}

/// Connect to the forwarded inspector port on the local host.
pub fn connect(timeout: Duration) -> io::Result<TcpStream> {
    let addr = SocketAddr::from(([127, 0, 0, 1], INSPECTOR_PORT));
    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(stream)
}

//! Framing: length-prefix (4 bytes big-endian) + payload.
//!
//! The carrier is a point-to-point stream with no message boundaries and
//! no end-of-stream signal usable mid-conversation, so every message is
//! length-prefixed and the reader consumes exactly the announced number
//! of bytes. The cap bounds memory against hostile length prefixes.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{PeerLinkError, Result};

const LEN_SIZE: usize = 4;

/// Upper bound on a single frame payload (16 MiB)
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Write one frame: 4-byte big-endian length, then the payload.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_FRAME_LEN as usize {
        return Err(PeerLinkError::FrameTooLarge {
            size: payload.len(),
            max: MAX_FRAME_LEN as usize,
        });
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame: exactly 4 length bytes, then exactly that many
/// payload bytes.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let mut len_bytes = [0u8; LEN_SIZE];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(PeerLinkError::FrameTooLarge {
            size: len as usize,
            max: MAX_FRAME_LEN as usize,
        });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

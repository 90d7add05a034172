//! # Journal Frame Format (C3)
//!
//! Every record in the journal is wrapped in a fixed frame:
//!
//! ```text
//! [magic:4][command:12][payload_len:u32][checksum:u32][payload:payload_len]
//! ```
//!
//! `command` is a NUL-padded ASCII string, always `"rec"` for this crate.
//! `checksum` is the first 4 bytes (little-endian, read as `u32`) of
//! `sha256d(payload)`.
//!
//! A frame reader distinguishes a clean end-of-stream (no bytes at all
//! before the frame header) from a torn write (some but not all of a frame
//! present) so that [`crate::journal::Journal::open_and_replay`] can report
//! the offset of the last fully-valid record and leave truncation of the
//! file to the caller.

use crate::codec::Reader;
use crate::error::FramingError;
use crate::types::sha256d;

/// Length in bytes of the frame header: `4 + 12 + 4 + 4`.
pub const HEADER_LEN: usize = 24;

/// Length in bytes of the `command` field.
const COMMAND_LEN: usize = 12;

/// The only command this crate ever writes or expects to read.
pub const RECORD_COMMAND: &str = "rec";

/// A decoded frame: the header fields plus the raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Network magic, expected to match the index's configured magic.
    pub magic: [u8; 4],
    /// NUL-padded command string, expected to be `"rec"`.
    pub command: String,
    /// Raw payload bytes (not yet decoded as a [`crate::types::Block`]).
    pub payload: Vec<u8>,
}

/// Result of attempting to read one frame from a byte slice.
pub enum ReadOutcome {
    /// A full, well-formed frame was read, along with the offset immediately
    /// past it.
    Frame(Frame, usize),
    /// Zero bytes remained: a clean end of stream.
    Eof,
}

/// Append a frame for `payload` to `out`, using `magic` as the network magic
/// and `"rec"` as the command.
pub fn write_frame(out: &mut Vec<u8>, magic: [u8; 4], payload: &[u8]) {
    out.extend_from_slice(&magic);
    let mut command_bytes = [0u8; COMMAND_LEN];
    let command = RECORD_COMMAND.as_bytes();
    command_bytes[..command.len()].copy_from_slice(command);
    out.extend_from_slice(&command_bytes);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&checksum(payload).to_le_bytes());
    out.extend_from_slice(payload);
}

/// Compute a frame's checksum: the first 4 little-endian bytes of
/// `sha256d(payload)`.
pub fn checksum(payload: &[u8]) -> u32 {
    let digest = sha256d(payload);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Attempt to read one frame starting at the beginning of `buf`, verifying
/// `expected_magic` and the checksum.
///
/// Returns [`ReadOutcome::Eof`] only when `buf` is entirely empty; any
/// partial data present is a [`FramingError::Truncated`], since a clean
/// stream never ends mid-frame.
pub fn read_frame(buf: &[u8], expected_magic: [u8; 4]) -> Result<ReadOutcome, FramingError> {
    if buf.is_empty() {
        return Ok(ReadOutcome::Eof);
    }
    if buf.len() < HEADER_LEN {
        return Err(FramingError::Truncated);
    }

    let mut reader = Reader::new(buf);
    let magic_bytes = reader.read_bytes(4).map_err(|_| FramingError::Truncated)?;
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&magic_bytes);
    if magic != expected_magic {
        return Err(FramingError::BadMagic {
            expected: expected_magic,
            actual: magic,
        });
    }

    let command_bytes = reader
        .read_bytes(COMMAND_LEN)
        .map_err(|_| FramingError::Truncated)?;
    let command_end = command_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(COMMAND_LEN);
    let command = String::from_utf8_lossy(&command_bytes[..command_end]).into_owned();
    if command != RECORD_COMMAND {
        return Err(FramingError::BadCommand(command));
    }

    let payload_len = reader
        .read_u32_le()
        .map_err(|_| FramingError::Truncated)? as usize;
    let expected_checksum = reader.read_u32_le().map_err(|_| FramingError::Truncated)?;

    if reader.remaining() < payload_len {
        return Err(FramingError::Truncated);
    }
    let payload = reader
        .read_bytes(payload_len)
        .map_err(|_| FramingError::Truncated)?;

    let actual_checksum = checksum(&payload);
    if actual_checksum != expected_checksum {
        return Err(FramingError::BadChecksum {
            expected: expected_checksum,
            actual: actual_checksum,
        });
    }

    let consumed = reader.position();
    Ok(ReadOutcome::Frame(
        Frame {
            magic,
            command,
            payload,
        },
        consumed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: [u8; 4] = *b"PICO";

    #[test]
    fn frame_roundtrip() {
        let payload = b"hello block".to_vec();
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, &payload);

        match read_frame(&buf, MAGIC).unwrap() {
            ReadOutcome::Frame(frame, consumed) => {
                assert_eq!(frame.magic, MAGIC);
                assert_eq!(frame.command, "rec");
                assert_eq!(frame.payload, payload);
                assert_eq!(consumed, buf.len());
            }
            ReadOutcome::Eof => panic!("expected a frame"),
        }
    }

    #[test]
    fn empty_buffer_is_clean_eof() {
        assert!(matches!(read_frame(&[], MAGIC).unwrap(), ReadOutcome::Eof));
    }

    #[test]
    fn torn_header_is_truncated_not_eof() {
        let payload = b"payload".to_vec();
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, &payload);
        let torn = &buf[..HEADER_LEN - 1];
        assert!(matches!(
            read_frame(torn, MAGIC),
            Err(FramingError::Truncated)
        ));
    }

    #[test]
    fn torn_payload_is_truncated() {
        let payload = b"a longer payload than the header".to_vec();
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, &payload);
        let torn = &buf[..buf.len() - 3];
        assert!(matches!(
            read_frame(torn, MAGIC),
            Err(FramingError::Truncated)
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, b"x");
        let err = read_frame(&buf, *b"XXXX").unwrap_err();
        assert!(matches!(err, FramingError::BadMagic { .. }));
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, b"original");
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;
        let err = read_frame(&buf, MAGIC).unwrap_err();
        assert!(matches!(err, FramingError::BadChecksum { .. }));
    }

    #[test]
    fn second_frame_starts_where_first_ends() {
        let mut buf = Vec::new();
        write_frame(&mut buf, MAGIC, b"first");
        write_frame(&mut buf, MAGIC, b"second");

        let (first, consumed) = match read_frame(&buf, MAGIC).unwrap() {
            ReadOutcome::Frame(f, c) => (f, c),
            ReadOutcome::Eof => panic!("expected a frame"),
        };
        assert_eq!(first.payload, b"first");

        match read_frame(&buf[consumed..], MAGIC).unwrap() {
            ReadOutcome::Frame(second, _) => assert_eq!(second.payload, b"second"),
            ReadOutcome::Eof => panic!("expected a second frame"),
        }
    }
}

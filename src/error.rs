//! Error types for the block index core.
//!
//! One `thiserror` enum per component boundary, matching the failure table in
//! the design document. Lower-layer errors propagate upward through `#[from]`
//! rather than being flattened into a single catch-all.

use thiserror::Error;

use crate::codec::Hash256;

/// Errors raised by the primitive binary decoders (C1/C2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input buffer ran out before the value could be fully decoded.
    #[error("truncated input: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to complete the decode.
        needed: usize,
        /// Bytes actually remaining in the buffer.
        available: usize,
    },
}

/// Errors raised by the framed-message reader (C3).
#[derive(Debug, Error)]
pub enum FramingError {
    /// The frame header or payload ended before enough bytes were available.
    #[error("truncated frame")]
    Truncated,

    /// The frame's magic bytes did not match the network magic.
    #[error("bad magic: expected {expected:02x?}, got {actual:02x?}")]
    BadMagic {
        /// Magic configured on the index/journal.
        expected: [u8; 4],
        /// Magic read from the frame.
        actual: [u8; 4],
    },

    /// The frame's command string was not `"rec"`.
    #[error("bad command: expected \"rec\", got {0:?}")]
    BadCommand(String),

    /// The frame's checksum did not match the recomputed checksum of the payload.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    BadChecksum {
        /// Checksum stored in the frame.
        expected: u32,
        /// Checksum recomputed from the payload.
        actual: u32,
    },

    /// Underlying I/O failure while reading a frame.
    #[error("i/o error reading frame: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`crate::index::Index::add`] / `connect` (C5).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The index is empty and the incoming block's hash is not the configured genesis.
    #[error("genesis mismatch: first block must hash to the configured block0")]
    BadGenesis,

    /// The incoming block's parent is not present in the index.
    #[error("orphan block: parent {parent:02x?} is not known")]
    Orphan {
        /// Hash of the missing parent.
        parent: Hash256,
    },

    /// The incoming block's hash is already present in the index.
    #[error("block {0:02x?} is already indexed")]
    AlreadyKnown(Hash256),
}

/// Errors raised by the journal (C6): replay and append.
#[derive(Debug, Error)]
pub enum JournalError {
    /// A frame failed to parse.
    #[error(transparent)]
    Framing(#[from] FramingError),

    /// A record's payload failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A record's stored hash did not match the recomputed header hash.
    #[error("hash mismatch: record claims {claimed:02x?}, header hashes to {recomputed:02x?}")]
    HashMismatch {
        /// Hash stored alongside the header in the record.
        claimed: Hash256,
        /// Hash recomputed from the decoded header.
        recomputed: Hash256,
    },

    /// Replaying a record failed to connect it to the in-memory index.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A write to the journal file wrote fewer bytes than requested.
    #[error("short write: wrote {written} of {expected} bytes")]
    WriteFailed {
        /// Bytes actually written.
        written: usize,
        /// Bytes requested.
        expected: usize,
    },

    /// The data-sync step after an append failed.
    #[error("fsync failed: {0}")]
    SyncFailed(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level error returned by [`crate::index::Index::add`].
///
/// Combines the journal-append failure modes with the in-memory connect
/// failure modes into a single type, since a caller handling `add` needs
/// both.
#[derive(Debug, Error)]
pub enum Error {
    /// The node could not be connected to the header tree.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The journal append (or the replay that preceded it) failed.
    #[error(transparent)]
    Journal(#[from] JournalError),
}

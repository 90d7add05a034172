//! # Append-Only Journal (C6)
//!
//! A flat file of framed `"rec"` messages (`crate::framing`), each carrying
//! a hash and a full block. Opening a journal replays every record into an
//! in-memory [`crate::index::Index`]; appending writes a new record and
//! optionally calls `File::sync_data` before returning.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codec::{write_hash256, Hash256, Reader};
use crate::error::JournalError;
use crate::framing::{read_frame, write_frame, ReadOutcome};
use crate::index::Index;
use crate::types::{sha256d, Block};

/// Outcome of [`Journal::open_and_replay`]: the open journal handle plus a
/// report of how much of the file was clean.
pub struct ReplayReport {
    /// Byte offset of the end of the last successfully replayed record.
    /// Equal to the file length when the entire file replayed cleanly.
    pub last_clean_offset: u64,
    /// Number of records successfully replayed into the index.
    pub records_replayed: usize,
    /// Set if replay stopped early because of a torn or corrupt record.
    pub stopped_early: bool,
}

/// An open journal file.
pub struct Journal {
    file: File,
    path: PathBuf,
    /// Close (drop the file handle) when this value is dropped. Currently
    /// always true in practice since `File`'s own `Drop` always closes the
    /// descriptor; retained as an explicit field so callers can read the
    /// open policy back and because a future non-owning mode could set it
    /// to false.
    pub close_on_drop: bool,
    /// Whether `append` calls `File::sync_data` after each write.
    pub sync_on_write: bool,
}

impl Journal {
    /// Open `path` (creating it if absent), replay every record into
    /// `index`, and return the opened journal ready for further appends
    /// alongside a report of how much of the file replayed cleanly.
    ///
    /// On a torn or corrupt tail, replay stops at the first bad record;
    /// the index retains everything successfully connected up to that
    /// point, and `last_clean_offset` names where the good data ends so the
    /// caller can truncate before resuming appends. The crate never
    /// truncates the file itself.
    pub fn open_and_replay(
        path: impl AsRef<Path>,
        index: &mut Index,
        sync_on_write: bool,
    ) -> Result<(Self, ReplayReport), JournalError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let netmagic = index.netmagic();
        let mut offset = 0usize;
        let mut records_replayed = 0usize;
        let mut stopped_early = false;

        loop {
            match read_frame(&contents[offset..], netmagic) {
                Ok(ReadOutcome::Eof) => break,
                Ok(ReadOutcome::Frame(frame, consumed)) => {
                    match replay_one(&frame.payload, index) {
                        Ok(newly_connected) => {
                            offset += consumed;
                            if newly_connected {
                                records_replayed += 1;
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, offset, "journal replay stopped at bad record");
                            stopped_early = true;
                            break;
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, offset, "journal replay stopped at bad frame");
                    stopped_early = true;
                    break;
                }
            }
        }

        info!(
            records_replayed,
            last_clean_offset = offset,
            stopped_early,
            path = %path.display(),
            "journal replay complete"
        );

        file.seek(SeekFrom::End(0))?;

        Ok((
            Self {
                file,
                path,
                close_on_drop: true,
                sync_on_write,
            },
            ReplayReport {
                last_clean_offset: offset as u64,
                records_replayed,
                stopped_early,
            },
        ))
    }

    /// Path this journal is backed by.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a `(hash, header)` record to the journal, framed with
    /// `netmagic`, and optionally `fsync`-equivalent the write.
    ///
    /// A short write is reported as [`JournalError::WriteFailed`]; a failed
    /// sync is reported as [`JournalError::SyncFailed`]. Neither corrupts
    /// the file in a way that replay cannot recover from (the previous
    /// records remain intact either way).
    pub fn append(
        &mut self,
        hash: &Hash256,
        header: &Block,
        netmagic: [u8; 4],
    ) -> Result<(), JournalError> {
        let mut payload = Vec::new();
        write_hash256(&mut payload, hash);
        header.encode(&mut payload);

        let mut record = Vec::new();
        write_frame(&mut record, netmagic, &payload);

        let written = self.file.write(&record)?;
        if written != record.len() {
            return Err(JournalError::WriteFailed {
                written,
                expected: record.len(),
            });
        }

        if self.sync_on_write {
            self.file
                .sync_data()
                .map_err(|e| JournalError::SyncFailed(e.to_string()))?;
        }

        Ok(())
    }
}

/// Decode one record's payload as `(hash, header)`, verify the hash, and
/// connect it to `index`. Returns whether the record was newly connected
/// (`false` for an already-known duplicate, which is not an error).
fn replay_one(payload: &[u8], index: &mut Index) -> Result<bool, JournalError> {
    let mut reader = Reader::new(payload);
    let claimed_hash = reader.read_hash256()?;
    let header = Block::decode(&mut reader)?;

    let recomputed = header.hash();
    if recomputed != claimed_hash {
        return Err(JournalError::HashMismatch {
            claimed: claimed_hash,
            recomputed,
        });
    }

    let node = crate::block_info::BlockInfo::new_unconnected(claimed_hash, header);
    match index.connect(node) {
        Ok(_) => Ok(true),
        Err(crate::error::IndexError::AlreadyKnown(_)) => {
            // Re-replaying an already-connected record is expected and
            // harmless (see `Index::add`'s journal-before-connect ordering).
            Ok(false)
        }
        Err(err) => Err(JournalError::Index(err)),
    }
}

//! # Indexed Block Metadata (C4)
//!
//! [`BlockInfo`] is the per-node payload stored in the in-memory header
//! tree: the header itself, its hash, its cumulative work, its height, and
//! (optionally) where its full block lives on disk. It carries no pointer
//! to its parent or children; the tree structure lives entirely in
//! [`crate::index::Index::blocks`], keyed by owned hash.

use primitive_types::U256;

use crate::codec::Hash256;
use crate::types::Block;

/// A block header plus the bookkeeping the index needs to do best-chain
/// selection and reorg computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// This block's hash, cached rather than recomputed on every comparison.
    pub hash: Hash256,
    /// The six consensus-critical header fields (and `vtx`, carried along
    /// for completeness though the index itself only inspects the header).
    pub header: Block,
    /// Cumulative proof-of-work from genesis through this block, inclusive.
    pub work: U256,
    /// Height above genesis; genesis itself is height 0. `-1` marks a node
    /// that has been allocated but not yet connected to the tree.
    pub height: i32,
    /// Hash of the parent block, or `None` only for genesis.
    pub prev: Option<Hash256>,
    /// File identifier for the on-disk block store, or `-1` if unset.
    pub n_file: i32,
    /// Byte offset into that file, or `-1` if unset.
    pub n_pos: i64,
}

impl BlockInfo {
    /// Build a not-yet-connected `BlockInfo` for `header`, with height and
    /// on-disk location sentinels set per the unconnected state, and work
    /// and prev left at their zero values until [`crate::index::Index::connect`]
    /// fills them in.
    pub fn new_unconnected(hash: Hash256, header: Block) -> Self {
        Self {
            hash,
            header,
            work: U256::zero(),
            height: -1,
            prev: None,
            n_file: -1,
            n_pos: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Block {
        Block {
            n_version: 1,
            hash_prev_block: [0; 32],
            hash_merkle_root: [0; 32],
            n_time: 0,
            n_bits: 0x1d00ffff,
            n_nonce: 0,
            vtx: vec![],
        }
    }

    #[test]
    fn new_unconnected_has_sentinel_fields() {
        let info = BlockInfo::new_unconnected([1; 32], sample_header());
        assert_eq!(info.height, -1);
        assert_eq!(info.n_file, -1);
        assert_eq!(info.n_pos, -1);
        assert_eq!(info.work, U256::zero());
        assert_eq!(info.prev, None);
    }
}

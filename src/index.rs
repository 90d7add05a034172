//! # Index / Best-Chain Engine (C5)
//!
//! The in-memory directed tree of block headers, keyed by owned hash rather
//! than by pointer (see `SPEC_FULL.md` §9 on why a `HashMap<Hash256,
//! BlockInfo>` replaces the reference implementation's pointer-into-struct
//! keying). Owns best-chain selection by cumulative work, reorg delta
//! computation, and the block-locator walk, and optionally drives a
//! [`crate::journal::Journal`] for durability.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::codec::Hash256;
use crate::block_info::BlockInfo;
use crate::error::{Error, IndexError};
use crate::journal::Journal;
use crate::work::work_of;

/// The result of connecting a node that became (or remained) the best tip.
///
/// `disconnected`/`connected` are step counts along `prev` links, not node
/// lists: the engine does not materialise either path, matching the
/// reference `blkdb_connect` reorg walk. A caller that needs the actual
/// block hashes can walk `prev` links from `old_best`/the new tip's hash
/// for `disconnected`/`connected` steps respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgDelta {
    /// Number of blocks walked back from the previous tip to the lowest
    /// common ancestor with the new tip.
    pub disconnected: u32,
    /// Number of blocks walked back from the new tip to that same ancestor.
    pub connected: u32,
    /// Hash of the previous best tip, or `None` if the index was empty.
    pub old_best: Option<Hash256>,
}

/// The in-memory block index: header tree, best-chain pointer, and an
/// optional attached journal.
pub struct Index {
    /// Genesis hash, fixed at construction.
    block0: Hash256,
    /// Network magic used to frame journal records.
    netmagic: [u8; 4],
    /// Every known node, owned by this map.
    blocks: HashMap<Hash256, BlockInfo>,
    /// Hash of the current best-chain tip.
    best_chain: Option<Hash256>,
    /// Optional durability layer.
    journal: Option<Journal>,
}

impl Index {
    /// Create an empty index for the given network magic and genesis hash.
    /// No journal is attached; use [`Index::attach_journal`] to add one.
    pub fn new(netmagic: [u8; 4], block0: Hash256) -> Self {
        Self {
            block0,
            netmagic,
            blocks: HashMap::new(),
            best_chain: None,
            journal: None,
        }
    }

    /// Genesis hash this index was constructed with.
    pub fn block0(&self) -> Hash256 {
        self.block0
    }

    /// Network magic this index frames journal records with.
    pub fn netmagic(&self) -> [u8; 4] {
        self.netmagic
    }

    /// Attach an already-open journal, taking ownership of it.
    pub fn attach_journal(&mut self, journal: Journal) {
        self.journal = Some(journal);
    }

    /// Detach and return the journal, if one is attached.
    pub fn take_journal(&mut self) -> Option<Journal> {
        self.journal.take()
    }

    /// Number of nodes currently indexed.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the index holds no nodes yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a node by hash.
    pub fn get(&self, hash: &Hash256) -> Option<&BlockInfo> {
        self.blocks.get(hash)
    }

    /// Hash of the current best-chain tip, if any.
    pub fn best_chain(&self) -> Option<Hash256> {
        self.best_chain
    }

    /// Insert `node`, journaling it first if a journal is attached.
    ///
    /// If the journal append fails, the error is returned and in-memory
    /// state is left completely untouched. If the append succeeds but
    /// `connect` subsequently rejects the node, the journal record already
    /// written is retained; a future replay rejects it the same way (it is
    /// harmless, see `SPEC_FULL.md` §9).
    pub fn add(&mut self, node: BlockInfo) -> Result<ReorgDelta, Error> {
        if let Some(journal) = self.journal.as_mut() {
            journal.append(&node.hash, &node.header, self.netmagic)?;
        }
        Ok(self.connect(node)?)
    }

    /// Insert `node` into the header tree without touching the journal,
    /// used directly by replay (which journals nothing, since it is reading
    /// the journal it would otherwise write to).
    pub fn connect(&mut self, node: BlockInfo) -> Result<ReorgDelta, IndexError> {
        if self.blocks.contains_key(&node.hash) {
            warn!(hash = ?node.hash, "rejecting already-known block");
            return Err(IndexError::AlreadyKnown(node.hash));
        }

        let w = work_of(node.header.n_bits);
        let mut node = node;

        if self.blocks.is_empty() {
            if node.hash != self.block0 {
                warn!(hash = ?node.hash, block0 = ?self.block0, "rejecting non-genesis first block");
                return Err(IndexError::BadGenesis);
            }
            node.height = 0;
            node.work = w;
            node.prev = None;
        } else {
            let parent_hash = node.header.hash_prev_block;
            let parent = self
                .blocks
                .get(&parent_hash)
                .ok_or(IndexError::Orphan { parent: parent_hash })?;
            node.height = parent.height + 1;
            node.work = parent.work + w;
            node.prev = Some(parent_hash);
        }

        let node_hash = node.hash;
        let node_work = node.work;
        self.blocks.insert(node_hash, node);

        let becomes_best = match self.best_chain {
            None => true,
            Some(current_best) => {
                let current_work = self.blocks[&current_best].work;
                node_work > current_work
            }
        };

        if becomes_best {
            let delta = self.reorg_delta(self.best_chain, node_hash);
            info!(
                new_tip = ?node_hash,
                old_tip = ?self.best_chain,
                disconnected = delta.disconnected,
                connected = delta.connected,
                "adopting new best chain"
            );
            self.best_chain = Some(node_hash);
            Ok(delta)
        } else {
            Ok(ReorgDelta {
                disconnected: 0,
                connected: 0,
                old_best: self.best_chain,
            })
        }
    }

    /// Compute the reorg delta between the current `old` tip (if any) and
    /// `new`, per the four-step walk in `SPEC_FULL.md` §4.5 (ported
    /// unchanged in meaning from the reference `blkdb_connect`).
    fn reorg_delta(&self, old: Option<Hash256>, new: Hash256) -> ReorgDelta {
        let old_best = old;

        let Some(mut old) = old else {
            let mut connected = 0u32;
            let mut cur = new;
            loop {
                connected += 1;
                match self.blocks[&cur].prev {
                    Some(parent) => cur = parent,
                    None => break,
                }
            }
            return ReorgDelta {
                disconnected: 0,
                connected,
                old_best,
            };
        };

        let mut new = new;
        let mut disconnected = 0u32;
        let mut connected = 0u32;

        while self.blocks[&new].height > self.blocks[&old].height {
            connected += 1;
            new = self.blocks[&new]
                .prev
                .expect("node with height > 0 must have a parent");
        }

        while self.blocks[&old].height > self.blocks[&new].height {
            disconnected += 1;
            old = self.blocks[&old]
                .prev
                .expect("node with height > 0 must have a parent");
        }

        while old != new {
            disconnected += 1;
            connected += 1;
            old = self.blocks[&old]
                .prev
                .expect("distinct equal-height nodes must both have parents above genesis");
            new = self.blocks[&new]
                .prev
                .expect("distinct equal-height nodes must both have parents above genesis");
        }

        ReorgDelta {
            disconnected,
            connected,
            old_best,
        }
    }

    /// Produce a P2P block locator starting from `from_tip`, matching
    /// `blkdb_locator`'s exact step-doubling walk: push the current hash,
    /// then step back `step` parents (`step` starts at 1), stopping early if
    /// the parent chain is exhausted mid-step; only once that step-back is
    /// done does the locator double `step` for the next round, if it already
    /// holds more than 10 entries. Finally push `block0` unconditionally.
    pub fn locator(&self, from_tip: Hash256) -> Vec<Hash256> {
        let mut have = Vec::new();
        let mut step: u32 = 1;
        let mut cur = Some(from_tip);

        while let Some(hash) = cur {
            have.push(hash);

            let mut bi = Some(hash);
            let mut i = 0u32;
            while bi.is_some() && i < step {
                bi = self.blocks.get(&bi.unwrap()).and_then(|info| info.prev);
                i += 1;
            }
            cur = bi;

            if have.len() > 10 {
                step = step.saturating_mul(2);
            }
        }

        have.push(self.block0);
        have
    }
}

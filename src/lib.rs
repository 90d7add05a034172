//! The block index core of a minimal block-chain node.
//!
//! Maintains the in-memory directed tree of block headers observed on a
//! peer-to-peer network, selects the best chain by cumulative proof-of-work,
//! computes the reorganisation delta each time a header is connected, and
//! rehydrates its state from an append-only on-disk journal. Also provides
//! bit-exact Bitcoin peer-to-peer wire serialisation for addresses,
//! transactions, and blocks, since the index consumes nothing else.
//!
//! Out of scope: command-line entry points, configuration loading, the
//! peer-to-peer transport itself, script interpretation and signature
//! verification, wallet/RPC, and proof-of-work *validation* (only work
//! *accumulation* lives here). See each module's docs for its slice of the
//! design.
//!
//! ```no_run
//! use chain_index_core::block_info::BlockInfo;
//! use chain_index_core::index::Index;
//! use chain_index_core::journal::Journal;
//! use chain_index_core::types::Block;
//!
//! let genesis_header = Block {
//!     n_version: 1,
//!     hash_prev_block: [0; 32],
//!     hash_merkle_root: [0; 32],
//!     n_time: 1_231_006_505,
//!     n_bits: 0x1d00ffff,
//!     n_nonce: 2_083_236_893,
//!     vtx: vec![],
//! };
//! let genesis_hash = genesis_header.hash();
//!
//! let mut index = Index::new(*b"PICO", genesis_hash);
//! let (journal, _report) =
//!     Journal::open_and_replay("chain.journal", &mut index, true).unwrap();
//! index.attach_journal(journal);
//!
//! index
//!     .add(BlockInfo::new_unconnected(genesis_hash, genesis_header))
//!     .unwrap();
//! ```

pub mod block_info;
pub mod codec;
pub mod error;
pub mod framing;
pub mod index;
pub mod journal;
pub mod types;
pub mod work;

pub use block_info::BlockInfo;
pub use codec::Hash256;
pub use error::{CodecError, Error, FramingError, IndexError, JournalError};
pub use index::{Index, ReorgDelta};
pub use journal::{Journal, ReplayReport};
pub use types::{Address, Block, OutPoint, Tx, TxIn, TxOut, CADDR_TIME_VERSION};
pub use work::{target_from_bits, work_of};

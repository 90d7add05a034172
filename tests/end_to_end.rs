//! Black-box scenarios from `SPEC_FULL.md` §8, exercised against the public
//! API only (no access to `Index`'s private fields).

use tempfile::tempdir;

use chain_index_core::block_info::BlockInfo;
use chain_index_core::error::{Error, IndexError};
use chain_index_core::index::Index;
use chain_index_core::journal::Journal;
use chain_index_core::types::Block;

const MAGIC: [u8; 4] = *b"PICO";
const EASY_BITS: u32 = 0x207fffff;

fn header(hash_prev_block: [u8; 32], n_bits: u32, nonce: u32) -> Block {
    Block {
        n_version: 1,
        hash_prev_block,
        hash_merkle_root: [0; 32],
        n_time: 1_700_000_000,
        n_bits,
        n_nonce: nonce,
        vtx: vec![],
    }
}

fn node(hash_prev_block: [u8; 32], n_bits: u32, nonce: u32) -> BlockInfo {
    let h = header(hash_prev_block, n_bits, nonce);
    let hash = h.hash();
    BlockInfo::new_unconnected(hash, h)
}

#[test]
fn scenario_1_empty_plus_genesis() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);

    let delta = index.add(genesis.clone()).unwrap();

    assert_eq!(delta.disconnected, 0);
    assert_eq!(delta.connected, 1);
    assert_eq!(index.best_chain(), Some(genesis.hash));
    assert_eq!(index.get(&genesis.hash).unwrap().height, 0);
}

#[test]
fn scenario_2_linear_extension() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);
    index.add(genesis.clone()).unwrap();

    let b1 = node(genesis.hash, EASY_BITS, 1);
    let delta = index.add(b1.clone()).unwrap();

    assert_eq!(delta.disconnected, 0);
    assert_eq!(delta.connected, 1);
    assert_eq!(index.best_chain(), Some(b1.hash));
    assert_eq!(index.get(&b1.hash).unwrap().height, 1);
}

#[test]
fn scenario_3_equal_work_fork_does_not_win() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);
    index.add(genesis.clone()).unwrap();

    let b1 = node(genesis.hash, EASY_BITS, 1);
    index.add(b1.clone()).unwrap();

    let b1_prime = node(genesis.hash, EASY_BITS, 2);
    index.add(b1_prime).unwrap();

    assert_eq!(index.best_chain(), Some(b1.hash));
}

#[test]
fn scenario_4_fork_overtakes() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);
    index.add(genesis.clone()).unwrap();

    let b1 = node(genesis.hash, EASY_BITS, 1);
    index.add(b1.clone()).unwrap();

    let b1_prime = node(genesis.hash, EASY_BITS, 2);
    index.add(b1_prime.clone()).unwrap();

    let b2_prime = node(b1_prime.hash, EASY_BITS, 3);
    let delta = index.add(b2_prime.clone()).unwrap();

    assert_eq!(index.best_chain(), Some(b2_prime.hash));
    assert_eq!(delta.disconnected, 1);
    assert_eq!(delta.connected, 2);
    assert_eq!(delta.old_best, Some(b1.hash));
}

#[test]
fn scenario_5_orphan_rejection() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);
    index.add(genesis.clone()).unwrap();

    let orphan = node([0xAB; 32], EASY_BITS, 99);
    let err = index.add(orphan).unwrap_err();

    assert!(matches!(err, Error::Index(IndexError::Orphan { .. })));
    assert_eq!(index.len(), 1);
    assert_eq!(index.best_chain(), Some(genesis.hash));
}

#[test]
fn scenario_6_duplicate_rejection() {
    let genesis = node([0; 32], EASY_BITS, 0);
    let mut index = Index::new(MAGIC, genesis.hash);
    index.add(genesis.clone()).unwrap();

    let b1 = node(genesis.hash, EASY_BITS, 1);
    index.add(b1.clone()).unwrap();

    let err = index.add(b1.clone()).unwrap_err();

    assert!(matches!(err, Error::Index(IndexError::AlreadyKnown(h)) if h == b1.hash));
    assert_eq!(index.len(), 2);
    assert_eq!(index.best_chain(), Some(b1.hash));
}

#[test]
fn scenario_7_replay_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.dat");

    let genesis = node([0; 32], EASY_BITS, 0);

    let mut index = Index::new(MAGIC, genesis.hash);
    let (journal, report) = Journal::open_and_replay(&path, &mut index, true).unwrap();
    assert_eq!(report.records_replayed, 0);
    index.attach_journal(journal);

    index.add(genesis.clone()).unwrap();
    let b1 = node(genesis.hash, EASY_BITS, 1);
    index.add(b1.clone()).unwrap();
    let b1_prime = node(genesis.hash, EASY_BITS, 2);
    index.add(b1_prime.clone()).unwrap();
    let b2_prime = node(b1_prime.hash, EASY_BITS, 3);
    index.add(b2_prime.clone()).unwrap();

    drop(index.take_journal().unwrap());

    let mut fresh = Index::new(MAGIC, genesis.hash);
    let (_journal2, report2) = Journal::open_and_replay(&path, &mut fresh, true).unwrap();

    assert!(!report2.stopped_early);
    assert_eq!(report2.records_replayed, 4);
    assert_eq!(fresh.best_chain(), Some(b2_prime.hash));
    assert_eq!(fresh.len(), 4);
}

#[test]
fn scenario_8_truncated_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal.dat");

    let genesis = node([0; 32], EASY_BITS, 0);
    let b1 = node(genesis.hash, EASY_BITS, 1);

    let mut index = Index::new(MAGIC, genesis.hash);
    let (journal, _) = Journal::open_and_replay(&path, &mut index, false).unwrap();
    index.attach_journal(journal);
    index.add(genesis.clone()).unwrap();
    index.add(b1).unwrap();
    drop(index.take_journal().unwrap());

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 1);
    std::fs::write(&path, &bytes).unwrap();

    let mut fresh = Index::new(MAGIC, genesis.hash);
    let (_journal2, report) = Journal::open_and_replay(&path, &mut fresh, false).unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.records_replayed, 1);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh.best_chain(), Some(genesis.hash));
}

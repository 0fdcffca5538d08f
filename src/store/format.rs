// bintree-rust/src/store/format.rs
//! Snapshot blob layout: `[Header | Node Block | Metadata Block | EOF Block]`.
//! Every integer is big-endian.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::common::PayloadKind;

// --- Constants ---
pub const FILE_SIGNATURE: &[u8; 8] = b"BINTREE1";
pub const FORMAT_VERSION: u8 = 0x01;

pub const TAG_METADATA_BLOCK: u8 = 0x01;
pub const TAG_NODE_BLOCK: u8 = 0x10;
pub const TAG_EOF_BLOCK: u8 = 0xFF;

/// Header flag: the EOF block carries a BLAKE3 checksum of everything
/// before it.
pub const FLAG_OVERALL_CHECKSUM: u8 = 0x01;

pub const CRC32_CHECKSUM_SIZE: usize = 4;
pub const BLAKE3_CHECKSUM_SIZE: usize = 32;

const HEADER_PADDING: usize = 8;

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

/// The signature as the EOF block repeats it.
pub fn reversed_signature() -> [u8; 8] {
    let mut signature = *FILE_SIGNATURE;
    signature.reverse();
    signature
}

/// Fixed-size preamble: signature, version, flags, then the offsets of the
/// three blocks, then zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u8,
    pub flags: u8,
    pub offset_nodes: u64,
    pub offset_metadata: u64,
    pub offset_eof: u64,
}

impl FileHeader {
    pub const SIZE: usize = 8 + 2 + 3 * 8 + HEADER_PADDING;

    pub fn new(flags: u8, offset_nodes: u64, offset_metadata: u64, offset_eof: u64) -> Self {
        FileHeader {
            version: FORMAT_VERSION,
            flags,
            offset_nodes,
            offset_metadata,
            offset_eof,
        }
    }

    pub fn has_overall_checksum(&self) -> bool {
        self.flags & FLAG_OVERALL_CHECKSUM != 0
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(FILE_SIGNATURE)?;
        out.write_all(&[self.version, self.flags])?;
        for offset in [self.offset_nodes, self.offset_metadata, self.offset_eof] {
            out.write_u64::<BigEndian>(offset)?;
        }
        out.write_all(&[0; HEADER_PADDING])
    }

    /// Reads a header. A foreign signature is `InvalidData`; the version is
    /// left for the caller to judge.
    pub fn read_from<R: Read>(input: &mut R) -> io::Result<Self> {
        let mut signature = [0u8; 8];
        input.read_exact(&mut signature)?;
        if &signature != FILE_SIGNATURE {
            return Err(invalid_data("invalid signature"));
        }
        let mut version_and_flags = [0u8; 2];
        input.read_exact(&mut version_and_flags)?;
        let [version, flags] = version_and_flags;
        let offset_nodes = input.read_u64::<BigEndian>()?;
        let offset_metadata = input.read_u64::<BigEndian>()?;
        let offset_eof = input.read_u64::<BigEndian>()?;
        input.read_exact(&mut [0u8; HEADER_PADDING])?;
        Ok(FileHeader {
            version,
            flags,
            offset_nodes,
            offset_metadata,
            offset_eof,
        })
    }
}

/// Describes the tree a snapshot was taken from. Stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub name: Option<String>,
    pub kind: PayloadKind,
    pub node_count: u64,
    pub created_at: String,
}

/// Prefix of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFrame {
    pub tag: u8,
    /// Content length, frame excluded.
    pub len: u32,
    /// CRC32 of the content.
    pub crc: u32,
}

impl BlockFrame {
    pub const SIZE: usize = 1 + 4 + CRC32_CHECKSUM_SIZE;

    /// Frames `content`, or `None` when it is too long for a `u32` length.
    pub fn for_content(tag: u8, content: &[u8]) -> Option<Self> {
        let len = u32::try_from(content.len()).ok()?;
        Some(BlockFrame {
            tag,
            len,
            crc: calculate_crc32(content),
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u8(self.tag)?;
        out.write_u32::<BigEndian>(self.len)?;
        out.write_u32::<BigEndian>(self.crc)
    }

    pub fn read_from<R: Read>(input: &mut R) -> io::Result<Self> {
        Ok(BlockFrame {
            tag: input.read_u8()?,
            len: input.read_u32::<BigEndian>()?,
            crc: input.read_u32::<BigEndian>()?,
        })
    }
}

/// Trailer: tag, the two block offsets again, the reversed signature and,
/// when the header flag is set, the BLAKE3 checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EofBlock {
    pub offset_metadata: u64,
    pub offset_nodes: u64,
    pub checksum: Option<[u8; BLAKE3_CHECKSUM_SIZE]>,
}

impl EofBlock {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_u8(TAG_EOF_BLOCK)?;
        out.write_u64::<BigEndian>(self.offset_metadata)?;
        out.write_u64::<BigEndian>(self.offset_nodes)?;
        out.write_all(&reversed_signature())?;
        match &self.checksum {
            Some(checksum) => out.write_all(checksum),
            None => Ok(()),
        }
    }

    pub fn read_from<R: Read>(input: &mut R, with_checksum: bool) -> io::Result<Self> {
        if input.read_u8()? != TAG_EOF_BLOCK {
            return Err(invalid_data("EOF block tag mismatch"));
        }
        let offset_metadata = input.read_u64::<BigEndian>()?;
        let offset_nodes = input.read_u64::<BigEndian>()?;
        let mut signature = [0u8; 8];
        input.read_exact(&mut signature)?;
        if signature != reversed_signature() {
            return Err(invalid_data("EOF block reversed signature mismatch"));
        }
        let checksum = if with_checksum {
            let mut checksum = [0u8; BLAKE3_CHECKSUM_SIZE];
            input.read_exact(&mut checksum)?;
            Some(checksum)
        } else {
            None
        };
        Ok(EofBlock {
            offset_metadata,
            offset_nodes,
            checksum,
        })
    }
}

pub fn calculate_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

pub fn calculate_blake3_hash(data: &[u8]) -> [u8; BLAKE3_CHECKSUM_SIZE] {
    *blake3::hash(data).as_bytes()
}

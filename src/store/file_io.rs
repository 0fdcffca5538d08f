// bintree-rust/src/store/file_io.rs
use super::format::{
    calculate_blake3_hash, calculate_crc32, BlockFrame, EofBlock, FileHeader, SnapshotMetadata,
    FLAG_OVERALL_CHECKSUM, FORMAT_VERSION, TAG_METADATA_BLOCK, TAG_NODE_BLOCK,
};
use crate::common::PayloadKind;
use crate::error::{BinaryTreeError, Result};
use crate::node::{NodeStore, Payload};
use log::trace;
use std::io::{Cursor, Read, Seek, SeekFrom};

fn push_block(out: &mut Vec<u8>, tag: u8, content: &[u8], context: &str) -> Result<()> {
    let frame = BlockFrame::for_content(tag, content).ok_or_else(|| {
        BinaryTreeError::Serialization(format!("{} is too large: {} bytes", context, content.len()))
    })?;
    frame.write_to(out)?;
    out.extend_from_slice(content);
    Ok(())
}

/// Encodes a node arena plus its metadata into one framed blob.
pub fn write_snapshot<P: Payload>(
    store: &NodeStore<P>,
    metadata: &SnapshotMetadata,
    with_checksum: bool,
) -> Result<Vec<u8>> {
    let node_bytes = bincode::serialize(store)?;
    let metadata_json_bytes =
        serde_json::to_vec(metadata).map_err(|e| BinaryTreeError::Serialization(e.to_string()))?;

    let frame_size = BlockFrame::SIZE as u64;
    let offset_nodes = FileHeader::SIZE as u64;
    let offset_metadata = offset_nodes + frame_size + node_bytes.len() as u64;
    let offset_eof = offset_metadata + frame_size + metadata_json_bytes.len() as u64;

    let flags = if with_checksum { FLAG_OVERALL_CHECKSUM } else { 0 };
    let mut blob: Vec<u8> = Vec::with_capacity(offset_eof as usize + 64);
    FileHeader::new(flags, offset_nodes, offset_metadata, offset_eof).write_to(&mut blob)?;
    push_block(&mut blob, TAG_NODE_BLOCK, &node_bytes, "Node Block")?;
    push_block(&mut blob, TAG_METADATA_BLOCK, &metadata_json_bytes, "Metadata Block")?;

    // The checksum covers everything up to where the EOF block begins.
    EofBlock {
        offset_metadata,
        offset_nodes,
        checksum: with_checksum.then(|| calculate_blake3_hash(&blob)),
    }
    .write_to(&mut blob)?;

    trace!(
        "Wrote snapshot: {} node(s), {} bytes, checksum: {}.",
        metadata.node_count,
        blob.len(),
        with_checksum
    );
    Ok(blob)
}

fn read_block(file_bytes: &[u8], offset: u64, expected_tag: u8, context: &str) -> Result<Vec<u8>> {
    let mut reader = Cursor::new(file_bytes);
    reader.seek(SeekFrom::Start(offset))?;
    let frame = BlockFrame::read_from(&mut reader)
        .map_err(|e| BinaryTreeError::InvalidFileFormat(format!("Failed to read {} frame: {}", context, e)))?;
    if frame.tag != expected_tag {
        return Err(BinaryTreeError::InvalidFileFormat(format!("{} tag mismatch", context)));
    }
    let content_end = reader.position() + frame.len as u64;
    if content_end > file_bytes.len() as u64 {
        return Err(BinaryTreeError::InvalidFileFormat(format!("{} runs past the end of the file", context)));
    }
    let mut content = vec![0u8; frame.len as usize];
    reader.read_exact(&mut content)?;
    if calculate_crc32(&content) != frame.crc {
        return Err(BinaryTreeError::ChecksumMismatch { context: context.to_string() });
    }
    Ok(content)
}

/// Reads only the metadata of a snapshot, checking the framing on the way.
pub fn read_snapshot_metadata(file_bytes: &[u8]) -> Result<(FileHeader, SnapshotMetadata)> {
    let header = FileHeader::read_from(&mut Cursor::new(file_bytes))
        .map_err(|e| BinaryTreeError::InvalidFileFormat(format!("Failed to read header: {}", e)))?;
    if header.version != FORMAT_VERSION {
        return Err(BinaryTreeError::InvalidFileFormat(format!(
            "Unsupported version: {}",
            header.version
        )));
    }
    let metadata_json_bytes = read_block(file_bytes, header.offset_metadata, TAG_METADATA_BLOCK, "Metadata Block")?;
    let metadata: SnapshotMetadata = serde_json::from_slice(&metadata_json_bytes)
        .map_err(|e| BinaryTreeError::Deserialization(e.to_string()))?;
    Ok((header, metadata))
}

/// Decodes a blob produced by [`write_snapshot`]. `expected` is the kind of
/// the tree receiving the arena; a snapshot of another kind is rejected
/// before its nodes are decoded.
pub fn read_snapshot<P: Payload>(
    file_bytes: &[u8],
    expected: PayloadKind,
    verify_checksum: bool,
) -> Result<(NodeStore<P>, SnapshotMetadata)> {
    let (header, metadata) = read_snapshot_metadata(file_bytes)?;
    if !expected.is_compatible(&metadata.kind) {
        return Err(BinaryTreeError::IncompatibleTrees(format!(
            "snapshot holds {} but the tree is {}",
            metadata.kind, expected
        )));
    }

    if header.offset_eof > file_bytes.len() as u64 {
        return Err(BinaryTreeError::InvalidFileFormat("EOF offset in header is out of bounds.".into()));
    }
    let mut reader = Cursor::new(file_bytes);
    reader.seek(SeekFrom::Start(header.offset_eof))?;
    let eof_block = EofBlock::read_from(&mut reader, header.has_overall_checksum())
        .map_err(|e| BinaryTreeError::InvalidFileFormat(format!("Failed to read EOF block: {}", e)))?;
    if eof_block.offset_nodes != header.offset_nodes || eof_block.offset_metadata != header.offset_metadata {
        return Err(BinaryTreeError::InvalidFileFormat(
            "EOF block offsets disagree with the header.".into(),
        ));
    }

    if let (true, Some(expected_checksum)) = (verify_checksum, eof_block.checksum) {
        let calculated = calculate_blake3_hash(&file_bytes[..header.offset_eof as usize]);
        if calculated != expected_checksum {
            return Err(BinaryTreeError::ChecksumMismatch {
                context: format!(
                    "Overall file content: expected {}, calculated {}",
                    hex::encode(expected_checksum),
                    hex::encode(calculated)
                ),
            });
        }
    }

    let node_bytes = read_block(file_bytes, header.offset_nodes, TAG_NODE_BLOCK, "Node Block")?;
    let store: NodeStore<P> =
        bincode::deserialize(&node_bytes).map_err(|e| BinaryTreeError::Deserialization(e.to_string()))?;
    store
        .validate()
        .map_err(|e| BinaryTreeError::InvalidFileFormat(format!("Node Block is not a binary tree: {}", e)))?;
    if store.len() as u64 != metadata.node_count {
        return Err(BinaryTreeError::InvalidFileFormat(format!(
            "metadata announces {} node(s), Node Block holds {}",
            metadata.node_count,
            store.len()
        )));
    }
    trace!("Read snapshot {:?}: {} node(s).", metadata.name, store.len());
    Ok((store, metadata))
}

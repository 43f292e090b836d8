#![allow(dead_code)]

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use cram_io::{
    container::{Block, ReferenceSequenceContext, Slice, block::ContentType},
    reference::SearchPaths,
};
use noodles_sam as sam;

pub const FASTA: &[u8] = b">sq0\nACGTACGTAC\nGTACGTACGT\n>sq1\nTTTTGGGGCC\n";
pub const FAI: &[u8] = b"sq0\t20\t5\t10\t11\nsq1\t10\t32\t10\t11\n";

pub const HEADER: &str = "@HD\tVN:1.4\n@SQ\tSN:sq0\tLN:20\n@SQ\tSN:sq1\tLN:10\n";

/// Writes an indexed FASTA file to a directory and returns its path.
pub fn write_reference(dir: &Path) -> io::Result<PathBuf> {
    let src = dir.join("ref.fa");
    fs::write(&src, FASTA)?;
    fs::write(dir.join("ref.fa.fai"), FAI)?;
    Ok(src)
}

/// Returns search paths that only look in the given directory.
pub fn local_search_paths(dir: &Path) -> SearchPaths {
    SearchPaths::new(dir.to_string_lossy(), None)
}

pub fn header() -> sam::Header {
    HEADER.parse().unwrap()
}

/// Builds a single-record slice with one external block.
pub fn build_slice(
    reference_sequence_context: ReferenceSequenceContext,
    content_id: i32,
    data: &[u8],
) -> Slice {
    Slice::builder()
        .set_reference_sequence_context(reference_sequence_context)
        .set_record_count(1)
        .set_base_count(data.len() as u64)
        .add_block(Block::new(ContentType::ExternalData, content_id, data.to_vec()))
        .build()
}

pub fn hex(digest: &[u8; 16]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

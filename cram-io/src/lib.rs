//! **cram-io** reads and writes the structural layer of the CRAM format (versions 1.0, 1.1, and
//! 2.0): ITF8/LTF8 integers, blocks, containers, slices, and the reference sequences slices are
//! compressed against.
//!
//! Record-level encoding is left to a higher layer. This crate moves opaque block payloads in and
//! out of containers and serves reference bases on demand.
//!
//! # Examples
//!
//! ## Read all containers
//!
//! ```no_run
//! # use std::io;
//! use cram_io::{self as cram, Container};
//!
//! let mut reader = cram::io::reader::Builder::default().build_from_path("sample.cram")?;
//! reader.read_header()?;
//!
//! let mut container = Container::default();
//!
//! while reader.read_container(&mut container)? != 0 {
//!     for slice in container.slices() {
//!         println!("{} blocks", slice.blocks().len());
//!     }
//! }
//! # Ok::<_, io::Error>(())
//! ```

pub mod codecs;
pub mod container;
pub mod file_definition;
pub mod io;
pub mod reference;

pub use self::{container::Container, file_definition::FileDefinition};

pub(crate) const MAGIC_NUMBER: [u8; 4] = *b"CRAM";

/// Calculates the MD5 digest of a sequence after normalizing it.
///
/// Bytes outside `!`..=`~` are skipped and lowercase letters are uppercased before hashing.
pub fn calculate_normalized_sequence_digest(sequence: &[u8]) -> [u8; 16] {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();

    for &b in sequence {
        if b.is_ascii_graphic() {
            hasher.update([b.to_ascii_uppercase()]);
        }
    }

    hasher.finalize().into()
}

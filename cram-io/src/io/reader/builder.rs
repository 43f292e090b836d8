use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use super::Reader;
use crate::{
    io::{Options, Region},
    reference::{ReferenceSet, ReferenceSource, SearchPaths, SharedReferenceSet},
};

/// A CRAM reader builder.
#[derive(Default)]
pub struct Builder {
    reference_set: Option<SharedReferenceSet>,
    is_shared: bool,
    search_paths: Option<SearchPaths>,
    options: Options,
}

impl Builder {
    /// Sets the reference sequence set.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{io::reader::Builder, reference::ReferenceSet};
    /// let builder = Builder::default().set_reference_set(ReferenceSet::default());
    /// ```
    pub fn set_reference_set(mut self, reference_set: ReferenceSet) -> Self {
        self.reference_set = Some(SharedReferenceSet::new(reference_set));
        self.is_shared = false;
        self
    }

    /// Sets a reference sequence set shared with other sessions.
    ///
    /// Whole sequences loaded through a shared set are kept in the set while any session holds
    /// them.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{io::reader::Builder, reference::SharedReferenceSet};
    /// let builder = Builder::default().set_shared_reference_set(SharedReferenceSet::default());
    /// ```
    pub fn set_shared_reference_set(mut self, reference_set: SharedReferenceSet) -> Self {
        self.reference_set = Some(reference_set);
        self.is_shared = true;
        self
    }

    /// Sets the reference sequence search paths.
    ///
    /// By default, these are read from `REF_PATH` and `REF_CACHE` when the reader is built.
    pub fn set_search_paths(mut self, search_paths: SearchPaths) -> Self {
        self.search_paths = Some(search_paths);
        self
    }

    /// Sets whether to skip slice reference checksum verification.
    ///
    /// The default is `false`.
    pub fn set_ignore_checksums(mut self, value: bool) -> Self {
        self.options.ignore_checksums = value;
        self
    }

    /// Sets whether to decode per-record metadata.
    ///
    /// The default is `false`.
    pub fn set_decode_metadata(mut self, value: bool) -> Self {
        self.options.decode_metadata = value;
        self
    }

    /// Restricts reading to containers that overlap a region.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::{reader::Builder, Region};
    /// let builder = Builder::default().set_range(Region::new(0, 1, 1000));
    /// ```
    pub fn set_range(mut self, region: Region) -> Self {
        self.options.range = Some(region);
        self
    }

    /// Builds a CRAM reader from a path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cram_io::io::reader::Builder;
    /// let reader = Builder::default().build_from_path("sample.cram")?;
    /// # Ok::<_, std::io::Error>(())
    /// ```
    pub fn build_from_path<P>(self, src: P) -> io::Result<Reader<BufReader<File>>>
    where
        P: AsRef<Path>,
    {
        File::open(src).map(|file| self.build_from_reader(BufReader::new(file)))
    }

    /// Builds a CRAM reader from a reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::reader::Builder;
    /// let reader = Builder::default().build_from_reader(&[][..]);
    /// ```
    pub fn build_from_reader<R>(self, reader: R) -> Reader<R>
    where
        R: Read,
    {
        let search_paths = self.search_paths.unwrap_or_else(SearchPaths::from_env);

        let mut reference_source =
            ReferenceSource::new(self.reference_set.unwrap_or_default(), search_paths);
        reference_source.set_shared(self.is_shared);

        Reader {
            inner: reader,
            reference_source,
            options: self.options,
            file_definition: None,
            header: None,
            eof: false,
        }
    }
}

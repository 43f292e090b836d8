use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;

const REF_PATH: &str = "REF_PATH";
const REF_CACHE: &str = "REF_CACHE";
const DEFAULT_REF_PATH: &str = ".";

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Locations searched for reference sequences by MD5 checksum.
///
/// `ref_path` is a colon-separated list of directories or `%s` templates. `ref_cache` is a single
/// template naming where fetched sequences are cached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchPaths {
    ref_path: String,
    ref_cache: Option<String>,
}

impl SearchPaths {
    /// Creates search paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::reference::SearchPaths;
    /// let search_paths = SearchPaths::new("/data/md5", Some("/tmp/cache/%2s/%2s/%s".into()));
    /// ```
    pub fn new<P>(ref_path: P, ref_cache: Option<String>) -> Self
    where
        P: Into<String>,
    {
        Self {
            ref_path: ref_path.into(),
            ref_cache: ref_cache.filter(|s| !s.is_empty()),
        }
    }

    /// Reads search paths from the `REF_PATH` and `REF_CACHE` environment variables.
    ///
    /// `REF_PATH` defaults to the working directory. An empty or unset `REF_CACHE` disables the
    /// cache.
    pub fn from_env() -> Self {
        let ref_path = env::var(REF_PATH).unwrap_or_else(|_| DEFAULT_REF_PATH.into());
        let ref_cache = env::var(REF_CACHE).ok();
        Self::new(ref_path, ref_cache)
    }

    /// Returns the cache path of a sequence with the given MD5 checksum.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use cram_io::reference::SearchPaths;
    ///
    /// let search_paths = SearchPaths::new(".", Some("/tmp/cache/%2s/%s".into()));
    ///
    /// assert_eq!(
    ///     search_paths.cache_path("be19336b7e15968f7ac7dc82493d9cd8"),
    ///     Some(PathBuf::from("/tmp/cache/be/19336b7e15968f7ac7dc82493d9cd8"))
    /// );
    /// ```
    pub fn cache_path(&self, md5_checksum: &str) -> Option<PathBuf> {
        self.ref_cache
            .as_deref()
            .map(|template| PathBuf::from(expand_cache_path(template, md5_checksum)))
    }

    /// Returns the first existing file for a sequence with the given MD5 checksum.
    ///
    /// Remote entries are skipped.
    pub fn find(&self, md5_checksum: &str) -> Option<PathBuf> {
        for component in split_ref_path(&self.ref_path) {
            if is_remote(component) {
                debug!("skipping remote reference path: {component}");
                continue;
            }

            let candidate = if component.contains('%') {
                PathBuf::from(expand_cache_path(component, md5_checksum))
            } else {
                Path::new(component).join(md5_checksum)
            };

            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }
}

impl Default for SearchPaths {
    fn default() -> Self {
        Self::new(DEFAULT_REF_PATH, None)
    }
}

fn split_ref_path(ref_path: &str) -> Vec<&str> {
    let mut components = Vec::new();
    let mut start = 0;
    let mut rest = ref_path;

    while let Some(i) = rest.find(':') {
        let component = &ref_path[start..start + i];
        let scheme = component.strip_prefix("URL=").unwrap_or(component);
        let is_scheme = URL_SCHEMES.contains(&scheme) && rest[i + 1..].starts_with("//");

        if is_scheme {
            match rest[i + 1..].find(':') {
                Some(j) => {
                    components.push(&ref_path[start..start + i + 1 + j]);
                    start += i + 1 + j + 1;
                }
                None => {
                    components.push(&ref_path[start..]);
                    start = ref_path.len();
                }
            }
        } else {
            components.push(component);
            start += i + 1;
        }

        rest = &ref_path[start..];
    }

    components.push(rest);
    components.retain(|component| !component.is_empty());

    components
}

fn is_remote(component: &str) -> bool {
    component.starts_with("URL=") || component.contains("://")
}

/// Expands a cache path template with a file name.
///
/// In the template, `%s` is replaced with the rest of the name, and `%<n>s` is replaced with the
/// next `n` characters of the name. Any other `%` sequence is copied literally. If part of the name
/// remains unused, it is appended as a final path component.
///
/// # Examples
///
/// ```
/// use cram_io::reference::expand_cache_path;
///
/// assert_eq!(expand_cache_path("/cache/%2s/%2s/%s", "abcdef"), "/cache/ab/cd/ef");
/// assert_eq!(expand_cache_path("/cache", "abcdef"), "/cache/abcdef");
/// ```
pub fn expand_cache_path(template: &str, name: &str) -> String {
    let mut dst = String::with_capacity(template.len() + name.len() + 1);
    let mut name = name;
    let mut rest = template;

    while let Some(i) = rest.find('%') {
        dst.push_str(&rest[..i]);
        let spec = &rest[i + 1..];

        let digits_len = spec.bytes().take_while(u8::is_ascii_digit).count();

        if spec[digits_len..].starts_with('s') {
            let len = if digits_len == 0 {
                name.len()
            } else {
                spec[..digits_len]
                    .parse::<usize>()
                    .map(|n| floor_char_boundary(name, n))
                    .unwrap_or(name.len())
            };

            dst.push_str(&name[..len]);
            name = &name[len..];
            rest = &spec[digits_len + 1..];
        } else {
            dst.push('%');

            match spec.chars().next() {
                Some(c) => {
                    dst.push(c);
                    rest = &spec[c.len_utf8()..];
                }
                None => rest = spec,
            }
        }
    }

    dst.push_str(rest);

    if !name.is_empty() {
        if !dst.ends_with('/') {
            dst.push('/');
        }

        dst.push_str(name);
    }

    dst
}

fn floor_char_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());

    while !s.is_char_boundary(i) {
        i -= 1;
    }

    i
}

/// Writes a sequence to the cache.
///
/// The data is written to a uniquely named temporary file next to `dst`, synced, made read-only,
/// and renamed into place. The temporary file is removed on failure.
pub(crate) fn write_cache(dst: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        create_cache_dir(parent)?;
    }

    let (tmp_path, mut file) = create_tmp_file(dst)?;

    let result = file
        .write_all(data)
        .and_then(|_| file.sync_all())
        .and_then(|_| {
            let mut permissions = file.metadata()?.permissions();
            permissions.set_readonly(true);
            fs::set_permissions(&tmp_path, permissions)
        })
        .and_then(|_| fs::rename(&tmp_path, dst));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

fn create_tmp_file(dst: &Path) -> io::Result<(PathBuf, fs::File)> {
    let mut i = 0;

    loop {
        let mut s = dst.as_os_str().to_owned();
        s.push(format!(".tmp_{i}"));
        let tmp_path = PathBuf::from(s);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => return Ok((tmp_path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => i += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(unix)]
fn create_cache_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o1777)
        .create(path)
}

#[cfg(not(unix))]
fn create_cache_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

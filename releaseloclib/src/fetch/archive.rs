//! Archive extraction for gzip-compressed tarballs.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use crate::error::ReleaselocError;
use crate::Result;

/// Unpack a `.tgz` stream into `dest`.
///
/// Only directories and regular files are extracted; links and special files
/// are skipped. Relative paths and permission bits are preserved. Entries that
/// would land outside `dest` are refused by `tar` itself.
pub fn extract_archive<R: Read>(dest: impl AsRef<Path>, reader: R) -> Result<()> {
    let dest = dest.as_ref();
    let extract_err = |source: std::io::Error| ReleaselocError::Extract {
        path: dest.to_path_buf(),
        source,
    };

    fs::create_dir_all(dest).map_err(extract_err)?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);

    for entry in archive.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;

        match entry.header().entry_type() {
            EntryType::Directory | EntryType::Regular | EntryType::Continuous => {
                entry.unpack_in(dest).map_err(extract_err)?;
            }
            _ => continue,
        }
    }

    Ok(())
}

//! Newline counting.
//!
//! A line is anything terminated by `\n`; a trailing fragment without a
//! newline is not counted. This mirrors `wc -l` and keeps counting a pure
//! byte scan, independent of encoding.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use crate::error::ReleaselocError;
use crate::Result;

const BUFFER_SIZE: usize = 64 * 1024;

/// Count the newline-terminated lines in a byte stream.
///
/// # Example
///
/// ```rust
/// use releaseloclib::count_lines;
///
/// let text = "one\ntwo\nthree";
/// assert_eq!(count_lines(text.as_bytes()).unwrap(), 2);
/// ```
pub fn count_lines<R: Read>(mut reader: R) -> io::Result<u64> {
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut count = 0u64;

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        count += buf[..read].iter().filter(|&&b| b == b'\n').count() as u64;
    }

    Ok(count)
}

/// Count the lines of a file on disk.
pub fn count_file_lines(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ReleaselocError::io(path, e))?;
    count_lines(file).map_err(|e| ReleaselocError::io(path, e))
}

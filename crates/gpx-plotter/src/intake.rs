//! File intake: read one track file into memory, enforcing a size limit

use std::io::Read;
use std::path::{Path, PathBuf};

/// Default maximum input size: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, over the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

/// Read the whole file at `path` (`-` for stdin), rejecting anything over `max_bytes`.
///
/// The limit is checked against the file metadata first and again while reading,
/// so a file that grows after the check, or a stream, cannot exceed it.
pub fn read_track_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>, IntakeError> {
    if path == Path::new("-") {
        return read_track_stream(std::io::stdin().lock(), path, max_bytes);
    }

    let io_error = |source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    if size > max_bytes {
        return Err(IntakeError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }
    read_track_stream(file, path, max_bytes)
}

/// Read everything from `reader`, rejecting streams over `max_bytes`.
///
/// `path` only labels errors and logs (`-` for stdin).
pub fn read_track_stream<R: Read>(
    reader: R,
    path: &Path,
    max_bytes: u64,
) -> Result<Vec<u8>, IntakeError> {
    let bytes = read_limited(reader, max_bytes).map_err(|source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(IntakeError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    tracing::debug!("Read {} bytes from {}", size, path.display());
    Ok(bytes)
}

/// Read at most `max_bytes + 1` bytes, enough to tell whether the limit was exceeded
fn read_limited<R: Read>(reader: R, max_bytes: u64) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

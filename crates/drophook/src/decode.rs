//! Decoding of OS drop payloads into file paths.

use crate::error::DropError;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Accessors over an OS-owned drop payload (an `HDROP` on Windows).
///
/// The payload must be released with [`finish`](DropPayload::finish) exactly
/// once; [`decode_drop`] takes care of that.
pub trait DropPayload {
    /// Number of files in the drop.
    fn file_count(&self) -> Result<u32, DropError>;

    /// Length in UTF-16 units of the path at `index`, without terminator.
    fn path_len(&self, index: u32) -> Result<u32, DropError>;

    /// The path at `index`, given its length from [`path_len`](DropPayload::path_len).
    fn path(&self, index: u32, len: u32) -> Result<String, DropError>;

    /// Hand the payload back to the OS.
    fn finish(&mut self);
}

/// Owns a payload and releases it when dropped, on every exit path.
struct DropGuard<P: DropPayload> {
    payload: P,
}

impl<P: DropPayload> Drop for DropGuard<P> {
    fn drop(&mut self) {
        self.payload.finish();
    }
}

/// Read every path out of `payload`, in OS order, then release it.
///
/// Indices reporting zero length are skipped. Query errors are logged and
/// end decoding early; whatever was read so far is returned. A panicking
/// query yields an empty list. The payload is released in every case.
pub fn decode_drop<P: DropPayload>(payload: P) -> Vec<PathBuf> {
    let guard = DropGuard { payload };
    let result = panic::catch_unwind(AssertUnwindSafe(|| read_paths(&guard.payload)));
    match result {
        Ok(Ok(paths)) => {
            debug!(count = paths.len(), "decoded drop");
            paths
        }
        Ok(Err((paths, err))) => {
            warn!(error = %err, decoded = paths.len(), "drop query failed");
            paths
        }
        Err(_) => {
            error!("drop query panicked");
            Vec::new()
        }
    }
}

fn read_paths<P: DropPayload>(payload: &P) -> Result<Vec<PathBuf>, (Vec<PathBuf>, DropError)> {
    let count = payload.file_count().map_err(|err| (Vec::new(), err))?;
    let mut paths = Vec::with_capacity(count as usize);

    for index in 0..count {
        let len = match payload.path_len(index) {
            Ok(0) => continue,
            Ok(len) => len,
            Err(err) => return Err((paths, err)),
        };
        match payload.path(index, len) {
            Ok(path) if path.is_empty() => continue,
            Ok(path) => paths.push(PathBuf::from(path)),
            Err(err) => return Err((paths, err)),
        }
    }

    Ok(paths)
}

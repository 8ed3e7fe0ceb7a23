pub mod message_store;

pub use message_store::MessageStore;

use std::fs;
use std::io;
use std::path::Path;

/// Ensure the parent directory of a database path exists.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

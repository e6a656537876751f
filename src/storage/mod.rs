//! Storage module: the on-disk ledger cache.
//!
//! Codecs: gzip-compressed JSON (default) or plain JSON.
//! Use `storage::open(dir, codec, creator)` to build a cache rooted at a directory.

pub mod codec;
pub mod file_cache;

pub use codec::Codec;
pub use file_cache::{Creator, FileCache};

use crate::utils::Result;
use serde_json::Value;
use std::path::Path;

/// Open a ledger cache of JSON values encoded with `codec`.
pub fn open(dir: impl AsRef<Path>, codec: Codec, creator: Creator<Value>) -> Result<FileCache<Value>> {
    FileCache::open(dir, codec, creator)
}

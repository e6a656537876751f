use crate::utils::{LedgerToolError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// On-disk encoding of cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// gzip-compressed JSON, `.gz`
    #[default]
    Gzip,
    /// plain JSON, `.json`
    Plain,
}

impl Codec {
    pub fn suffix(&self) -> &'static str {
        match self {
            Codec::Gzip => ".gz",
            Codec::Plain => ".json",
        }
    }

    /// Write `value` to `path` via a temporary sibling so readers never see a
    /// half-written entry.
    pub fn write<V: Serialize>(&self, path: &Path, value: &V) -> Result<()> {
        let tmp = path.with_extension("tmp");
        {
            let file = BufWriter::new(File::create(&tmp)?);
            match self {
                Codec::Gzip => {
                    let mut enc = GzEncoder::new(file, Compression::default());
                    serde_json::to_writer(&mut enc, value)?;
                    enc.finish()?.flush()?;
                }
                Codec::Plain => {
                    let mut file = file;
                    serde_json::to_writer(&mut file, value)?;
                    file.flush()?;
                }
            }
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Read an entry. Any failure on an existing file is corruption, not a miss.
    pub fn read<V: DeserializeOwned>(&self, path: &Path) -> Result<V> {
        let corrupt = |reason: String| LedgerToolError::CacheCorruption {
            path: path.to_path_buf(),
            reason,
        };
        let file = File::open(path).map_err(|e| corrupt(e.to_string()))?;
        let reader: Box<dyn Read> = match self {
            Codec::Gzip => Box::new(GzDecoder::new(BufReader::new(file))),
            Codec::Plain => Box::new(BufReader::new(file)),
        };
        serde_json::from_reader(reader).map_err(|e| corrupt(e.to_string()))
    }
}

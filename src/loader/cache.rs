use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::logging;

use super::{parse_workbook, Dataset};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    ownership_sheet: String,
    holdings_sheet: String,
}

struct CacheEntry {
    checksum: u32,
    dataset: Arc<Dataset>,
}

/// Memoizes parsed workbooks by path and CRC32 of their content.
///
/// A file whose bytes change is re-parsed on the next [`DatasetCache::load`];
/// an unchanged file returns the same shared snapshot.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, config: &DashboardConfig) -> Result<Arc<Dataset>> {
        let path = &config.source_path;
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => DashboardError::SourceMissing(path.clone()),
            _ => DashboardError::Io(err),
        })?;
        let checksum = crc32fast::hash(&bytes);

        let key = CacheKey {
            path: path.clone(),
            ownership_sheet: config.ownership_sheet.clone(),
            holdings_sheet: config.holdings_sheet.clone(),
        };

        if let Some(entry) = self.entries.get(&key) {
            if entry.checksum == checksum {
                logging::info(
                    "cache.hit",
                    "Reusing parsed workbook",
                    json!({ "path": path.display().to_string(), "checksum": checksum }),
                );
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        logging::info(
            "cache.miss",
            "Parsing workbook",
            json!({
                "path": path.display().to_string(),
                "checksum": checksum,
                "bytes": bytes.len(),
            }),
        );
        let dataset = Arc::new(parse_workbook(bytes, config)?);
        self.entries.insert(
            key,
            CacheEntry {
                checksum,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

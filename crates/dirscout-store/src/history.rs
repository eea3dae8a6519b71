use std::collections::HashSet;
use std::path::PathBuf;

use dirscout_core::PhoneNormalizer;
use serde::Deserialize;

use crate::csv_store::read_all;
use crate::error::StoreError;

#[derive(Deserialize)]
struct PhoneColumn {
    #[serde(default)]
    phone: String,
}

/// Canonical phones that already have a verification outcome on disk.
///
/// Membership only grows; a phone once inserted is never checked again.
#[derive(Debug, Default, Clone)]
pub struct HistorySet {
    phones: HashSet<String>,
}

impl HistorySet {
    /// Rebuilds the history from the `phone` column of every store in `paths`.
    /// Stored values are re-normalized so older, non-canonical rows still match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if an existing store cannot be read.
    pub fn load(paths: &[PathBuf], normalizer: &PhoneNormalizer) -> Result<Self, StoreError> {
        let mut phones = HashSet::new();
        for path in paths {
            let rows: Vec<PhoneColumn> = read_all(path)?;
            let before = phones.len();
            phones.extend(
                rows.into_iter()
                    .map(|r| normalizer.normalize(&r.phone))
                    .filter(|p| !p.is_empty()),
            );
            tracing::debug!(
                path = %path.display(),
                added = phones.len() - before,
                "loaded verification history"
            );
        }
        Ok(Self { phones })
    }

    #[must_use]
    pub fn contains(&self, phone: &str) -> bool {
        self.phones.contains(phone)
    }

    /// Returns `true` if `phone` was not yet present.
    pub fn insert(&mut self, phone: String) -> bool {
        self.phones.insert(phone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }
}

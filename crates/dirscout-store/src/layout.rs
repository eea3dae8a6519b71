//! On-disk layout of the list, detail and verification stores.
//!
//! Current convention:
//!
//! ```text
//! {root}/{type}/{slug}/{slug}_{type}_list.csv
//! {root}/{type}/{slug}/{slug}_{type}_data.csv
//! {root}/whatsapp_data/verified_whatsapp_data.csv
//! {root}/whatsapp_data/not_verified_whatsapp_data.csv
//! ```
//!
//! Older runs wrote hotel-era names under `{root}/hotel_data/`; those are
//! still found when resolving inputs.

use std::path::{Path, PathBuf};

use dirscout_core::{area_slug, KNOWN_SEARCH_TYPES};

use crate::error::StoreError;

const LEGACY_DIR: &str = "hotel_data";
const VERIFICATION_DIR: &str = "whatsapp_data";

/// Which stage's output a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    List,
    Detail,
}

impl FileKind {
    fn suffix(self) -> &'static str {
        match self {
            FileKind::List => "list",
            FileKind::Detail => "data",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::List => write!(f, "list"),
            FileKind::Detail => write!(f, "detail"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path new rows of `kind` are written to for `area` and `search_type`.
    #[must_use]
    pub fn output_path(&self, kind: FileKind, area: &str, search_type: &str) -> PathBuf {
        let slug = area_slug(area);
        self.root
            .join(search_type)
            .join(&slug)
            .join(format!("{slug}_{search_type}_{}.csv", kind.suffix()))
    }

    #[must_use]
    pub fn verified_path(&self) -> PathBuf {
        self.root
            .join(VERIFICATION_DIR)
            .join("verified_whatsapp_data.csv")
    }

    #[must_use]
    pub fn not_verified_path(&self) -> PathBuf {
        self.root
            .join(VERIFICATION_DIR)
            .join("not_verified_whatsapp_data.csv")
    }

    /// Both verification stores, the inputs of the verification history.
    #[must_use]
    pub fn verification_paths(&self) -> Vec<PathBuf> {
        vec![self.verified_path(), self.not_verified_path()]
    }

    /// Every path probed for an existing `kind` file, in resolution order.
    ///
    /// With no `search_type`, the current convention is tried for each of
    /// the known business types before falling back to legacy names.
    #[must_use]
    pub fn candidates(&self, kind: FileKind, area: &str, search_type: Option<&str>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        match search_type {
            Some(t) => paths.push(self.output_path(kind, area, t)),
            None => {
                for t in KNOWN_SEARCH_TYPES {
                    paths.push(self.output_path(kind, area, t));
                }
            }
        }

        let slug = area_slug(area);
        let spaced = area.trim().replace(' ', "_");
        let suffix = kind.suffix();

        let mut legacy_names = Vec::new();
        if let Some(t) = search_type {
            legacy_names.push(format!("{spaced}_{t}_{suffix}.csv"));
        }
        for name in [
            format!("{spaced}_hotels_{suffix}.csv"),
            format!("{spaced}_hotel_{suffix}.csv"),
            format!("{spaced}_{suffix}.csv"),
        ] {
            if !legacy_names.contains(&name) {
                legacy_names.push(name);
            }
        }

        let legacy_root = self.root.join(LEGACY_DIR);
        for name in &legacy_names {
            paths.push(legacy_root.join(&slug).join(name));
        }
        for name in &legacy_names {
            paths.push(legacy_root.join(name));
        }
        paths
    }

    /// First existing `kind` file for `area`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InputMissing`] listing every path tried when none exists.
    pub fn resolve(
        &self,
        kind: FileKind,
        area: &str,
        search_type: Option<&str>,
    ) -> Result<PathBuf, StoreError> {
        let tried = self.candidates(kind, area, search_type);
        match tried.iter().find(|p| p.is_file()) {
            Some(found) => {
                tracing::debug!(kind = %kind, path = %found.display(), "resolved input file");
                Ok(found.clone())
            }
            None => Err(StoreError::InputMissing { kind, tried }),
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;

//! Single-file snapshot of a [`Catalog`].
//!
//! The snapshot holds every store, the aligned corpus, the raw caption list
//! and the feature-file registry, so queries can run without touching the
//! raw sources. Any failure to write, read or trust the file surfaces
//! as [`OpsError::Persistence`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{OpsError, OpsResult};

/// Version of the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Summary written ahead of the catalog body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub version: u32,
    pub saved_at: SystemTime,
    pub records: usize,
    pub dimension: usize,
    pub normalized: bool,
}

impl SnapshotHeader {
    fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: SystemTime::now(),
            records: catalog.corpus().len(),
            dimension: catalog.corpus().dimension(),
            normalized: catalog.corpus().is_normalized(),
        }
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    header: SnapshotHeader,
    catalog: &'a Catalog,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    header: SnapshotHeader,
    catalog: Catalog,
}

/// Reads and writes the snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a snapshot exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Persist `catalog`, replacing any previous snapshot.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so an interrupted save leaves the previous snapshot intact.
    /// A corpus holding NaN or infinite components is refused: JSON cannot
    /// represent them and the file could never be loaded back.
    pub fn save(&self, catalog: &Catalog) -> OpsResult<SnapshotHeader> {
        if let Some(record) = catalog.corpus().first_non_finite() {
            return Err(self.error(format!(
                "record {record} has a non-finite feature component"
            )));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        let header = SnapshotHeader::for_catalog(catalog);
        let json = serde_json::to_string(&SnapshotRef {
            header: header.clone(),
            catalog,
        })
        .map_err(|e| self.error(e))?;

        let staging = self.staging_path();
        if let Err(e) = std::fs::write(&staging, json)
            .and_then(|()| std::fs::rename(&staging, &self.path))
        {
            let _ = std::fs::remove_file(&staging);
            return Err(self.error(e));
        }

        info!(
            path = %self.path.display(),
            records = header.records,
            dimension = header.dimension,
            "saved snapshot"
        );
        Ok(header)
    }

    /// Load the snapshot, if it exists.
    pub fn load(&self) -> OpsResult<Option<(Catalog, SnapshotHeader)>> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no snapshot");
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        let snapshot: SnapshotOwned = serde_json::from_str(&json).map_err(|e| self.error(e))?;
        let SnapshotOwned { header, catalog } = snapshot;

        if header.version != SNAPSHOT_VERSION {
            return Err(self.error(format!(
                "unsupported snapshot version {} (expected {})",
                header.version, SNAPSHOT_VERSION
            )));
        }
        let corpus = catalog.corpus();
        if header.records != corpus.len()
            || header.dimension != corpus.dimension()
            || header.normalized != corpus.is_normalized()
        {
            return Err(self.error(format!(
                "header ({} records, dim {}) disagrees with body ({} records, dim {})",
                header.records,
                header.dimension,
                corpus.len(),
                corpus.dimension()
            )));
        }

        if header.normalized && !corpus.has_unit_vectors() {
            return Err(self.error("header marks the corpus normalized but it holds non-unit vectors"));
        }

        info!(
            path = %self.path.display(),
            records = header.records,
            "loaded snapshot"
        );
        Ok(Some((catalog, header)))
    }

    /// Load the snapshot, failing if it does not exist.
    pub fn load_required(&self) -> OpsResult<(Catalog, SnapshotHeader)> {
        self.load()?
            .ok_or_else(|| self.error("snapshot does not exist; run `fsc build` first"))
    }

    /// Remove the snapshot file.
    pub fn clean(&self) -> OpsResult<()> {
        if self.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.error(e))?;
            info!(path = %self.path.display(), "removed snapshot");
        }
        Ok(())
    }

    /// Temporary file next to the snapshot used while saving.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, message: impl ToString) -> OpsError {
        OpsError::persistence(&self.path, message)
    }
}

#[cfg(test)]
mod tests {
    use framescope_core::{CaptionStore, FeatureCorpus, FramePathStore, KeyFrameSelector};

    use super::*;
    use crate::features::FeatureFiles;

    fn catalog_with(records: Vec<(Vec<f32>, &str, &str)>) -> Catalog {
        let mut catalog = Catalog::assemble(
            13,
            CaptionStore::new(),
            FramePathStore::new(),
            KeyFrameSelector::new(),
            FeatureFiles::new(),
        )
        .unwrap();
        catalog.replace_corpus(FeatureCorpus::from_records(records).unwrap());
        catalog
    }

    #[test]
    fn test_save_refuses_non_finite_corpus() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("snapshot.json"));

        let good = catalog_with(vec![(vec![1.0, 0.0], "a", "a.jpg")]);
        store.save(&good).unwrap();

        let bad = catalog_with(vec![
            (vec![1.0, 0.0], "a", "a.jpg"),
            (vec![f32::INFINITY, 1.0], "b", "b.jpg"),
        ]);
        let err = store.save(&bad).unwrap_err();
        assert!(matches!(err, OpsError::Persistence { ref message, .. } if message.contains("record 1")));

        let (restored, header) = store.load().unwrap().unwrap();
        assert_eq!(restored, good);
        assert_eq!(header.records, 1);
    }

    #[test]
    fn test_save_replaces_through_staging_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("snapshot.json"));
        let staging = tmp.path().join("snapshot.json.tmp");

        // Leftover from an interrupted save.
        std::fs::write(&staging, "{ trunc").unwrap();

        let first = catalog_with(vec![(vec![1.0, 0.0], "a", "a.jpg")]);
        store.save(&first).unwrap();
        assert!(!staging.exists());

        let second = catalog_with(vec![
            (vec![0.0, 1.0], "b", "b.jpg"),
            (vec![1.0, 1.0], "c", "c.jpg"),
        ]);
        store.save(&second).unwrap();
        assert!(!staging.exists());

        let (restored, _) = store.load().unwrap().unwrap();
        assert_eq!(restored, second);

        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("snapshot.json")]);
    }

    #[test]
    fn test_load_rejects_normalized_flag_on_raw_vectors() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("snapshot.json"));
        store
            .save(&catalog_with(vec![(vec![3.0, 4.0], "a", "a.jpg")]))
            .unwrap();

        let mut doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        doc["header"]["normalized"] = serde_json::json!(true);
        doc["catalog"]["corpus"]["normalized"] = serde_json::json!(true);
        std::fs::write(store.path(), doc.to_string()).unwrap();

        assert!(matches!(store.load(), Err(OpsError::Persistence { .. })));
    }
}

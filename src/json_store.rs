//! JSON-file-backed [`ChunkStore`] implementation.
//!
//! The whole store is one JSON array of `{id, text, embedding, meta}`
//! records. Every mutation rewrites the full file: the new contents are
//! written to a temporary file in the same directory and renamed over the
//! old one, so a crash mid-write never leaves a truncated store behind.
//!
//! Concurrent writers from *other processes* are not coordinated.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use notes_rag_core::error::RagError;
use notes_rag_core::models::Chunk;
use notes_rag_core::store::{check_dims, ChunkStore};

/// Chunk store mirrored 1:1 to a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    chunks: Vec<Chunk>,
}

impl JsonFileStore {
    /// Load the store at `path`, creating an empty file if none exists.
    ///
    /// # Errors
    ///
    /// - [`RagError::CorruptStore`] if the file is not a JSON array of
    ///   complete records, mixes embedding dimensions, or repeats an id.
    /// - [`RagError::Io`] if the file cannot be read or created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RagError> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let store = Self {
                path,
                chunks: Vec::new(),
            };
            store.save()?;
            info!(path = %store.path.display(), "created empty chunk store");
            return Ok(store);
        }

        let raw = std::fs::read(&path)?;
        let chunks: Vec<Chunk> =
            serde_json::from_slice(&raw).map_err(|e| RagError::corrupt(&path, e.to_string()))?;

        if let Err(e) = check_dims(None, &chunks) {
            return Err(RagError::corrupt(&path, e.to_string()));
        }
        let mut seen = HashSet::with_capacity(chunks.len());
        if let Some(dup) = chunks.iter().find(|c| !seen.insert(c.id.as_str())) {
            return Err(RagError::corrupt(&path, format!("duplicate chunk id {}", dup.id)));
        }

        info!(path = %path.display(), chunks = chunks.len(), "loaded chunk store");
        Ok(Self { path, chunks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChunkStore for JsonFileStore {
    fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn append(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError> {
        check_dims(self.dims(), &chunks)?;
        let before = self.chunks.len();
        self.chunks.extend(chunks);
        if let Err(e) = self.save() {
            self.chunks.truncate(before);
            return Err(e);
        }
        Ok(())
    }

    fn save(&self) -> Result<(), RagError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let data = serde_json::to_vec_pretty(&self.chunks).map_err(std::io::Error::from)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| RagError::Io(e.error))?;

        debug!(path = %self.path.display(), chunks = self.chunks.len(), "saved chunk store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_rag_core::embedding::EmbeddingProvider;
    use notes_rag_core::models::Meta;
    use notes_rag_core::Rag;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn meta(source: &str) -> Meta {
        json!({ "source": source, "page": 3 }).as_object().cloned().unwrap()
    }

    #[test]
    fn test_open_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("rag_db.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .append(vec![
                Chunk::new("first passage", vec![0.1, -0.25, 1e-9], meta("a.pdf")),
                Chunk::new("second passage ✓", vec![0.0, 0.0, 0.0], meta("b.txt")),
            ])
            .unwrap();
        store
            .append(vec![Chunk::new("third", vec![3.5, 2.0, -1.0], Meta::new())])
            .unwrap();

        let reloaded = JsonFileStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        for (a, b) in store.chunks().iter().zip(reloaded.chunks()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
            assert_eq!(a.meta, b.meta);
            for (x, y) in a.embedding.iter().zip(&b.embedding) {
                assert!((x - y).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_invalid_json_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, RagError::CorruptStore { .. }));
    }

    #[test]
    fn test_missing_field_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        std::fs::write(&path, r#"[{"id": "a", "text": "t", "meta": {}}]"#).unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, RagError::CorruptStore { .. }));
        assert!(err.to_string().contains("embedding"));
    }

    #[test]
    fn test_mixed_dimensions_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a", "text": "t", "embedding": [1.0, 0.0], "meta": {}},
                {"id": "b", "text": "u", "embedding": [1.0], "meta": {}}
            ]"#,
        )
        .unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(RagError::CorruptStore { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a", "text": "t", "embedding": [1.0], "meta": {}},
                {"id": "a", "text": "u", "embedding": [0.5], "meta": {}}
            ]"#,
        )
        .unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(RagError::CorruptStore { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .append(vec![Chunk::new("a", vec![1.0, 0.0], Meta::new())])
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store
            .append(vec![Chunk::new("b", vec![1.0], Meta::new())])
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .append(vec![Chunk::new("a", vec![1.0], Meta::new())])
            .unwrap();
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_save_rolls_back_append() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("store");
        let mut store = JsonFileStore::open(dir.join("rag_db.json")).unwrap();
        store
            .append(vec![Chunk::new("a", vec![1.0], Meta::new())])
            .unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        let err = store
            .append(vec![Chunk::new("b", vec![0.5], Meta::new())])
            .unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.chunks()[0].text, "a");
    }

    /// Embeds every text as the same 2-d vector.
    struct ConstantProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for ConstantProvider {
        fn model_name(&self) -> &str {
            "constant"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, RagError> {
            Ok(vec![vec![0.6, 0.8]; texts.len()])
        }
    }

    #[tokio::test]
    async fn test_add_document_persists_before_returning() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rag_db.json");
        let rag = Rag::new(Arc::new(ConstantProvider), JsonFileStore::open(&path).unwrap());

        let added = rag
            .add_document(&"A".repeat(1000), Some(meta("letters.txt")), 100, 20)
            .await
            .unwrap();
        assert_eq!(added, 13);

        let in_memory: Vec<Chunk> = rag.with_store(|s| s.chunks().to_vec()).unwrap();
        let reloaded = JsonFileStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 13);
        for (a, b) in in_memory.iter().zip(reloaded.chunks()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
            assert_eq!(b.meta, meta("letters.txt"));
            assert_eq!(b.embedding, vec![0.6, 0.8]);
        }
        assert_eq!(reloaded.chunks()[0].text.len(), 100);
        assert_eq!(reloaded.chunks()[12].text.len(), 40);
    }
}

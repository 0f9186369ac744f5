//! Persistence of the index / chunk file pair.
//!
//! The vector index (`index.bin`) and the chunk texts (`chunks.json`) live
//! side by side and are only ever written and read together. The index
//! header carries a SHA-256 fingerprint of the chunk file, so a chunk file
//! from a different build is detected on load instead of silently mapping
//! positions to the wrong text.

use crate::types::IndexStats;
use crate::vector_index::{FlatL2Index, FINGERPRINT_LEN};
use chrono::{DateTime, Utc};
use docent_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the encoded vector index.
pub const INDEX_FILE: &str = "index.bin";

/// File name of the parallel chunk-text collection.
pub const CHUNKS_FILE: &str = "chunks.json";

/// An index loaded together with its chunk texts.
///
/// Position `i` in `index` and `chunks` refers to the same chunk.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: FlatL2Index,
    pub chunks: Vec<String>,
}

impl LoadedIndex {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }
}

/// Reads and writes the index pair in one directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at `dir` (typically `.docent/index`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.dir.join(CHUNKS_FILE)
    }

    /// Whether both files of the pair are present.
    pub fn exists(&self) -> bool {
        self.index_path().is_file() && self.chunks_path().is_file()
    }

    /// Persist `index` and `chunks`, replacing any previous pair.
    ///
    /// Both files are written to temporaries and fsynced before either is
    /// renamed into place, chunks first and index last. Between the two
    /// renames, or if the second one fails, the new chunk file sits next to
    /// the previous index; the fingerprint makes `load` reject that pair.
    pub fn save(&self, index: &FlatL2Index, chunks: &[String]) -> AppResult<()> {
        if index.len() != chunks.len() {
            return Err(AppError::Index(format!(
                "Index has {} vectors but {} chunks were given",
                index.len(),
                chunks.len()
            )));
        }

        fs::create_dir_all(&self.dir)?;

        let chunk_bytes = serde_json::to_vec(chunks)?;
        let fingerprint = fingerprint(&chunk_bytes);
        let index_bytes = index.to_bytes(&fingerprint);

        let chunks_path = self.chunks_path();
        let index_path = self.index_path();
        let chunks_tmp = tmp_path(&chunks_path);
        let index_tmp = tmp_path(&index_path);

        let written = write_synced(&chunks_tmp, &chunk_bytes)
            .and_then(|_| write_synced(&index_tmp, &index_bytes));
        if let Err(e) = written {
            let _ = fs::remove_file(&chunks_tmp);
            let _ = fs::remove_file(&index_tmp);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&chunks_tmp, &chunks_path) {
            let _ = fs::remove_file(&chunks_tmp);
            let _ = fs::remove_file(&index_tmp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&index_tmp, &index_path) {
            let _ = fs::remove_file(&index_tmp);
            tracing::error!(
                "Failed to move {:?} into place after replacing the chunk file; \
                 the index pair is inconsistent until the next ingest: {}",
                index_path,
                e
            );
            return Err(e.into());
        }

        tracing::info!(
            "Saved index: {} chunks, dimension {} -> {:?}",
            index.len(),
            index.dimension(),
            self.dir
        );

        Ok(())
    }

    /// Load the pair, verifying that the files belong together.
    ///
    /// # Errors
    /// * `AppError::Config` - If either file is missing
    /// * `AppError::Index` - If the index is corrupt or the pair is mismatched
    pub fn load(&self) -> AppResult<LoadedIndex> {
        let index_path = self.index_path();
        let chunks_path = self.chunks_path();

        match (index_path.is_file(), chunks_path.is_file()) {
            (true, true) => {}
            (false, false) => {
                return Err(AppError::Config(format!(
                    "No knowledge base found in {:?}. Run `docent ingest` first.",
                    self.dir
                )))
            }
            (true, false) => {
                return Err(AppError::Config(format!(
                    "Index file {:?} has no paired chunk file {:?}; run `docent ingest`",
                    index_path, chunks_path
                )))
            }
            (false, true) => {
                return Err(AppError::Config(format!(
                    "Chunk file {:?} has no paired index file {:?}; run `docent ingest`",
                    chunks_path, index_path
                )))
            }
        }

        let index_bytes = fs::read(&index_path)?;
        let chunk_bytes = fs::read(&chunks_path)?;

        let (index, expected_fingerprint) = FlatL2Index::from_bytes(&index_bytes)?;

        if fingerprint(&chunk_bytes) != expected_fingerprint {
            return Err(AppError::Index(format!(
                "Chunk file {:?} does not belong to index {:?}. Run `docent ingest` to rebuild.",
                chunks_path, index_path
            )));
        }

        let chunks: Vec<String> = serde_json::from_slice(&chunk_bytes)?;

        if chunks.len() != index.len() {
            return Err(AppError::Index(format!(
                "Index has {} vectors but chunk file has {} entries",
                index.len(),
                chunks.len()
            )));
        }

        tracing::debug!(
            "Loaded index from {:?}: {} chunks, dimension {}",
            self.dir,
            chunks.len(),
            index.dimension()
        );

        Ok(LoadedIndex { index, chunks })
    }

    /// Describe the persisted pair.
    pub fn stats(&self) -> AppResult<IndexStats> {
        let loaded = self.load()?;
        let index_meta = fs::metadata(self.index_path())?;
        let chunks_meta = fs::metadata(self.chunks_path())?;

        Ok(IndexStats {
            chunks: loaded.len(),
            dimension: loaded.dimension(),
            index_bytes: index_meta.len(),
            chunks_bytes: chunks_meta.len(),
            built_at: index_meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

fn fingerprint(bytes: &[u8]) -> [u8; FINGERPRINT_LEN] {
    Sha256::digest(bytes).into()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

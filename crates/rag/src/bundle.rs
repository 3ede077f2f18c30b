//! Bundle persistence.
//!
//! A bundle is the durable form of one indexed document, stored as three
//! sibling artifacts keyed by the bundle name `P`:
//!
//! - `P.index`: the flat index (little-endian binary),
//! - `P_embeds.bin`: the raw embedding matrix (rows x cols header + f32 data),
//! - `P_pages.json`: the page texts as a JSON array.
//!
//! Writes go to temp files in the store directory and are renamed into
//! place only after all three artifacts are fully written, so a crashed
//! build never leaves a half-visible bundle. Loads cross-check the three
//! artifacts against each other before returning.

use crate::index::{bytes_to_embedding, embedding_to_bytes, read_u32, FlatIndex};
use crate::types::BundleStats;
use askpdf_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes identifying an embedding matrix artifact.
const MATRIX_MAGIC: [u8; 4] = *b"APMX";

/// Current matrix artifact format version.
const MATRIX_VERSION: u32 = 1;

/// An indexed document, ready for retrieval.
///
/// The three parts stay position-aligned: row `i` of the matrix is the
/// embedding of `pages[i]`, and position `i` in the index refers to it.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Nearest-neighbor index over the page embeddings
    pub index: FlatIndex,

    /// One embedding row per page, in page order
    pub embeddings: Vec<Vec<f32>>,

    /// One text string per page, in page order
    pub pages: Vec<String>,
}

/// Filesystem store for bundles.
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether all three artifacts for `name` are present.
    pub fn exists(&self, name: &str) -> bool {
        self.index_path(name).exists()
            && self.embeds_path(name).exists()
            && self.pages_path(name).exists()
    }

    /// Persist a bundle under `name`, replacing any previous bundle of
    /// the same name.
    pub fn save(&self, name: &str, bundle: &Bundle) -> AppResult<()> {
        validate_name(name)?;
        check_consistency(name, bundle)?;

        fs::create_dir_all(&self.root)?;

        let index_path = self.index_path(name);
        let embeds_path = self.embeds_path(name);
        let pages_path = self.pages_path(name);

        let index_tmp = temp_path(&index_path);
        let embeds_tmp = temp_path(&embeds_path);
        let pages_tmp = temp_path(&pages_path);

        // Write all three temps before renaming any of them
        {
            let mut writer = BufWriter::new(File::create(&index_tmp)?);
            bundle.index.write_to(&mut writer)?;
            writer.flush()?;
        }

        {
            let mut writer = BufWriter::new(File::create(&embeds_tmp)?);
            write_matrix(&mut writer, &bundle.embeddings, bundle.index.dim())?;
            writer.flush()?;
        }

        {
            let mut writer = BufWriter::new(File::create(&pages_tmp)?);
            serde_json::to_writer(&mut writer, &bundle.pages)?;
            writer.flush()?;
        }

        fs::rename(&index_tmp, &index_path)?;
        fs::rename(&embeds_tmp, &embeds_path)?;
        fs::rename(&pages_tmp, &pages_path)?;

        tracing::info!(
            "Saved bundle '{}' ({} pages, {} dims)",
            name,
            bundle.pages.len(),
            bundle.index.dim()
        );

        Ok(())
    }

    /// Load the bundle stored under `name`.
    ///
    /// # Errors
    /// * `AppError::NotFound` - no bundle of that name has been built
    /// * `AppError::Integrity` - the artifacts disagree with each other
    pub fn load(&self, name: &str) -> AppResult<Bundle> {
        validate_name(name)?;

        if !self.exists(name) {
            return Err(AppError::NotFound(format!(
                "No bundle named '{}'. Run 'askpdf build' first.",
                name
            )));
        }

        let mut index_reader = BufReader::new(File::open(self.index_path(name))?);
        let index = FlatIndex::read_from(&mut index_reader)?;

        let mut embeds_reader = BufReader::new(File::open(self.embeds_path(name))?);
        let (embeddings, cols) = read_matrix(&mut embeds_reader)?;

        let pages_reader = BufReader::new(File::open(self.pages_path(name))?);
        let pages: Vec<String> = serde_json::from_reader(pages_reader)?;

        if embeddings.len() != pages.len() {
            return Err(AppError::Integrity(format!(
                "Bundle '{}' is corrupt: matrix has {} rows but page list has {} pages",
                name,
                embeddings.len(),
                pages.len()
            )));
        }

        if index.len() != embeddings.len() {
            return Err(AppError::Integrity(format!(
                "Bundle '{}' is corrupt: index has {} rows but matrix has {}",
                name,
                index.len(),
                embeddings.len()
            )));
        }

        if index.dim() != cols {
            return Err(AppError::Integrity(format!(
                "Bundle '{}' is corrupt: index dimension {} does not match matrix columns {}",
                name,
                index.dim(),
                cols
            )));
        }

        tracing::debug!("Loaded bundle '{}' ({} pages)", name, pages.len());

        Ok(Bundle {
            index,
            embeddings,
            pages,
        })
    }

    /// Artifact sizes and shape of the bundle stored under `name`.
    pub fn stat(&self, name: &str) -> AppResult<BundleStats> {
        validate_name(name)?;

        if !self.exists(name) {
            return Err(AppError::NotFound(format!(
                "No bundle named '{}'. Run 'askpdf build' first.",
                name
            )));
        }

        let index_meta = fs::metadata(self.index_path(name))?;
        let embeds_meta = fs::metadata(self.embeds_path(name))?;
        let pages_meta = fs::metadata(self.pages_path(name))?;

        let mut embeds_reader = BufReader::new(File::open(self.embeds_path(name))?);
        let (rows, cols) = read_matrix_header(&mut embeds_reader)?;

        let built_at = index_meta
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(BundleStats {
            name: name.to_string(),
            page_count: rows,
            dimensions: cols,
            index_bytes: index_meta.len(),
            embeds_bytes: embeds_meta.len(),
            pages_bytes: pages_meta.len(),
            built_at,
        })
    }

    fn index_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.index", name))
    }

    fn embeds_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}_embeds.bin", name))
    }

    fn pages_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}_pages.json", name))
    }
}

/// Reject names that are empty or would escape the store directory.
fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Input("Bundle name must not be empty".to_string()));
    }

    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::Input(format!("Invalid bundle name: '{}'", name)));
    }

    Ok(())
}

/// Verify the in-memory bundle is position-aligned before writing it.
fn check_consistency(name: &str, bundle: &Bundle) -> AppResult<()> {
    if bundle.embeddings.len() != bundle.pages.len() || bundle.index.len() != bundle.pages.len() {
        return Err(AppError::Integrity(format!(
            "Refusing to save bundle '{}': index/matrix/page counts disagree ({}/{}/{})",
            name,
            bundle.index.len(),
            bundle.embeddings.len(),
            bundle.pages.len()
        )));
    }

    for row in &bundle.embeddings {
        if row.len() != bundle.index.dim() {
            return Err(AppError::Integrity(format!(
                "Refusing to save bundle '{}': matrix row has {} columns, index dimension is {}",
                name,
                row.len(),
                bundle.index.dim()
            )));
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_os_string();
    os_string.push(".tmp");
    PathBuf::from(os_string)
}

/// Write the embedding matrix artifact.
fn write_matrix<W: Write>(writer: &mut W, embeddings: &[Vec<f32>], cols: usize) -> AppResult<()> {
    writer.write_all(&MATRIX_MAGIC)?;
    writer.write_all(&MATRIX_VERSION.to_le_bytes())?;
    writer.write_all(&(embeddings.len() as u32).to_le_bytes())?;
    writer.write_all(&(cols as u32).to_le_bytes())?;

    for row in embeddings {
        writer.write_all(&embedding_to_bytes(row))?;
    }

    Ok(())
}

/// Read the embedding matrix artifact, returning rows and column count.
fn read_matrix<R: Read>(reader: &mut R) -> AppResult<(Vec<Vec<f32>>, usize)> {
    let (rows, cols) = read_matrix_header(reader)?;

    let mut embeddings = Vec::with_capacity(rows);
    let mut row_bytes = vec![0u8; cols * 4];
    for _ in 0..rows {
        reader.read_exact(&mut row_bytes)?;
        embeddings.push(bytes_to_embedding(&row_bytes)?);
    }

    Ok((embeddings, cols))
}

/// Read and validate the matrix artifact header.
fn read_matrix_header<R: Read>(reader: &mut R) -> AppResult<(usize, usize)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MATRIX_MAGIC {
        return Err(AppError::Integrity(
            "Not a valid embedding matrix artifact (bad magic)".to_string(),
        ));
    }

    let version = read_u32(reader)?;
    if version != MATRIX_VERSION {
        return Err(AppError::Integrity(format!(
            "Unsupported matrix artifact version: {}",
            version
        )));
    }

    let rows = read_u32(reader)? as usize;
    let cols = read_u32(reader)? as usize;

    Ok((rows, cols))
}

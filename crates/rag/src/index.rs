//! Flat exact nearest-neighbor index.
//!
//! Stores one embedding per page and answers top-k queries by exhaustive
//! scan over squared Euclidean (L2) distance. Exactness and a stable,
//! non-decreasing distance order are the contract; the scan is an
//! implementation detail callers must not rely on.
//!
//! The index is append-only: vectors are added in page order at build
//! time and never updated or removed.

use askpdf_core::{AppError, AppResult};
use std::io::{Read, Write};

/// Magic bytes identifying an index artifact.
const INDEX_MAGIC: [u8; 4] = *b"APIX";

/// Current index artifact format version.
const INDEX_VERSION: u32 = 1;

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row position of the matched vector (the page number)
    pub position: usize,

    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Exhaustive nearest-neighbor index over squared L2 distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    /// Vector dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector. Its row position is the current length.
    pub fn add(&mut self, vector: &[f32]) -> AppResult<()> {
        if vector.len() != self.dim {
            return Err(AppError::Integrity(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                self.dim
            )));
        }

        self.vectors.push(vector.to_vec());
        Ok(())
    }

    /// Find up to `k` nearest vectors to the query.
    ///
    /// Results are sorted by non-decreasing squared L2 distance; ties keep
    /// their row order. Fewer than `k` hits are returned when the index
    /// holds fewer vectors.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(AppError::Integrity(format!(
                "Query has {} dimensions, index expects {}",
                query.len(),
                self.dim
            )));
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Serialize the index in its little-endian binary layout.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> AppResult<()> {
        writer.write_all(&INDEX_MAGIC)?;
        writer.write_all(&INDEX_VERSION.to_le_bytes())?;
        writer.write_all(&(self.dim as u32).to_le_bytes())?;
        writer.write_all(&(self.vectors.len() as u32).to_le_bytes())?;

        for vector in &self.vectors {
            writer.write_all(&embedding_to_bytes(vector))?;
        }

        Ok(())
    }

    /// Deserialize an index written by [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(reader: &mut R) -> AppResult<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != INDEX_MAGIC {
            return Err(AppError::Integrity(
                "Not a valid index artifact (bad magic)".to_string(),
            ));
        }

        let version = read_u32(reader)?;
        if version != INDEX_VERSION {
            return Err(AppError::Integrity(format!(
                "Unsupported index artifact version: {}",
                version
            )));
        }

        let dim = read_u32(reader)? as usize;
        let rows = read_u32(reader)? as usize;

        let mut vectors = Vec::with_capacity(rows);
        let mut row_bytes = vec![0u8; dim * 4];
        for _ in 0..rows {
            reader.read_exact(&mut row_bytes)?;
            vectors.push(bytes_to_embedding(&row_bytes)?);
        }

        Ok(Self { dim, vectors })
    }
}

/// Squared Euclidean distance between two equal-length vectors.
pub(crate) fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Convert an embedding vector to little-endian bytes for storage.
pub(crate) fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to an embedding vector.
pub(crate) fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Integrity(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}

/// Read a little-endian u32.
pub(crate) fn read_u32<R: Read>(reader: &mut R) -> AppResult<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

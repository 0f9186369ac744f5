//! Exact L2 vector index.
//!
//! A flat list of vectors searched by brute force. Collections here are
//! small (hundreds to low thousands of chunks), so a linear scan keeps
//! results exact and reproducible with nothing to tune.

use docent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Magic bytes at the start of an encoded index.
pub const INDEX_MAGIC: &[u8; 8] = b"DOCIDX01";

/// Current encoding version.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Length of the paired chunk-file fingerprint in the header.
pub const FINGERPRINT_LEN: usize = 32;

// magic + version + dimension + count + fingerprint
const HEADER_LEN: usize = 8 + 4 + 4 + 8 + FINGERPRINT_LEN;

/// One search hit: index position and squared Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Immutable exact-search index over fixed-dimension vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    /// Build an index over `vectors`.
    ///
    /// # Errors
    /// Returns an index error when `vectors` is empty, a vector is empty, or
    /// the vectors disagree on dimension.
    pub fn build(vectors: Vec<Vec<f32>>) -> AppResult<Self> {
        let dimension = match vectors.first() {
            Some(first) => first.len(),
            None => {
                return Err(AppError::Index(
                    "Cannot build an index over zero vectors".to_string(),
                ))
            }
        };

        if dimension == 0 {
            return Err(AppError::Index(
                "Cannot index zero-dimension vectors".to_string(),
            ));
        }

        if let Some((position, vector)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(AppError::Index(format!(
                "Vector {} has dimension {}, expected {}",
                position,
                vector.len(),
                dimension
            )));
        }

        Ok(Self { dimension, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` nearest vectors to `query`, nearest first.
    ///
    /// Ties are broken by position. `k` larger than the index returns every
    /// vector.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(AppError::Index(format!(
                "Query has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k.min(self.len()));

        Ok(neighbors)
    }

    /// Encode the index, binding it to the paired chunk file's fingerprint.
    pub fn to_bytes(&self, fingerprint: &[u8; FINGERPRINT_LEN]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.len() * self.dimension * 4);

        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(fingerprint);

        for value in self.vectors.iter().flatten() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        bytes
    }

    /// Decode an index, returning it with the chunk-file fingerprint it
    /// was written against.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<(Self, [u8; FINGERPRINT_LEN])> {
        if bytes.len() < HEADER_LEN {
            return Err(AppError::Index(format!(
                "Index file truncated: {} bytes, header needs {}",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let (header, body) = bytes.split_at(HEADER_LEN);

        if &header[0..8] != INDEX_MAGIC {
            return Err(AppError::Index("Not a docent index file".to_string()));
        }

        let version = read_u32(&header[8..12]);
        if version != INDEX_FORMAT_VERSION {
            return Err(AppError::Index(format!(
                "Unsupported index format version {} (expected {})",
                version, INDEX_FORMAT_VERSION
            )));
        }

        let dimension = read_u32(&header[12..16]) as usize;
        let count = read_u64(&header[16..24]) as usize;

        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        fingerprint.copy_from_slice(&header[24..HEADER_LEN]);

        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AppError::Index("Index header sizes overflow".to_string()))?;
        if body.len() != expected {
            return Err(AppError::Index(format!(
                "Index body is {} bytes, header describes {} vectors of dimension {} ({} bytes)",
                body.len(),
                count,
                dimension,
                expected
            )));
        }

        let vectors = if dimension == 0 {
            Vec::new()
        } else {
            body.chunks_exact(dimension * 4)
                .map(|row| {
                    row.chunks_exact(4)
                        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                        .collect()
                })
                .collect()
        };

        Ok((Self::build(vectors)?, fingerprint))
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> FlatL2Index {
        FlatL2Index::build(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_build_rejects_empty_and_ragged() {
        assert!(matches!(
            FlatL2Index::build(Vec::new()),
            Err(AppError::Index(_))
        ));
        assert!(matches!(
            FlatL2Index::build(vec![vec![1.0, 2.0], vec![1.0]]),
            Err(AppError::Index(_))
        ));
        assert!(matches!(
            FlatL2Index::build(vec![vec![]]),
            Err(AppError::Index(_))
        ));
    }

    #[test]
    fn test_search_orders_by_distance_then_position() {
        let index = sample();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();

        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 3, 0, 2]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[2].distance, 1.0);
        assert_eq!(hits[3].distance, 5.0);
    }

    #[test]
    fn test_search_clamps_k() {
        let index = sample();
        assert_eq!(index.search(&[0.0, 0.0], 100).unwrap().len(), 4);
        assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let result = sample().search(&[0.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(AppError::Index(_))));
    }

    #[test]
    fn test_bytes_round_trip() {
        let index = sample();
        let fingerprint = [7u8; FINGERPRINT_LEN];

        let (decoded, decoded_fingerprint) =
            FlatL2Index::from_bytes(&index.to_bytes(&fingerprint)).unwrap();

        assert_eq!(decoded, index);
        assert_eq!(decoded_fingerprint, fingerprint);
    }

    #[test]
    fn test_from_bytes_rejects_corruption() {
        let bytes = sample().to_bytes(&[0u8; FINGERPRINT_LEN]);

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(FlatL2Index::from_bytes(&bad_magic).is_err());

        let truncated = &bytes[..bytes.len() - 3];
        assert!(FlatL2Index::from_bytes(truncated).is_err());

        assert!(FlatL2Index::from_bytes(&bytes[..10]).is_err());
    }

    fn vector_set(dim: usize) -> impl Strategy<Value = Vec<Vec<f32>>> {
        prop::collection::vec(prop::collection::vec(-100.0f32..100.0, dim), 1..40)
    }

    proptest! {
        #[test]
        fn prop_search_is_sorted_and_complete(
            (vectors, query) in (1usize..8).prop_flat_map(|dim| {
                (vector_set(dim), prop::collection::vec(-100.0f32..100.0, dim))
            }),
            k in 0usize..60,
        ) {
            let index = FlatL2Index::build(vectors.clone()).unwrap();
            let hits = index.search(&query, k).unwrap();

            prop_assert_eq!(hits.len(), k.min(vectors.len()));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
                if pair[0].distance == pair[1].distance {
                    prop_assert!(pair[0].position < pair[1].position);
                }
            }
        }

        #[test]
        fn prop_decoded_index_searches_identically(
            (vectors, query) in (1usize..8).prop_flat_map(|dim| {
                (vector_set(dim), prop::collection::vec(-100.0f32..100.0, dim))
            }),
        ) {
            let index = FlatL2Index::build(vectors).unwrap();
            let (decoded, _) = FlatL2Index::from_bytes(&index.to_bytes(&[1u8; 32])).unwrap();

            prop_assert_eq!(
                index.search(&query, index.len()).unwrap(),
                decoded.search(&query, decoded.len()).unwrap()
            );
        }
    }
}

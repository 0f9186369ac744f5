//! Hashed n-gram embedding provider for fully offline operation.

use crate::embeddings::provider::EmbeddingProvider;
use docent_core::{AppError, AppResult};
use std::collections::BTreeMap;

const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const WORD_SEED: u64 = 0xcbf2_9ce4_8422_2325;
const TRIGRAM_SEED: u64 = 0x8422_2325_cbf2_9ce4;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "who", "how", "when", "where", "why", "do",
    "does", "did",
];

/// Feature-hashing embedding model.
///
/// Each text is lowercased and split into alphanumeric tokens; stop words are
/// dropped. Every remaining word contributes its own hashed feature plus the
/// character trigrams of the word padded with `#` on both sides (`sky` gives
/// `#sk`, `sky`, `ky#`). The resulting vector is L2-normalised, so texts
/// without any content words map to the zero vector.
///
/// Not semantically aware like a neural model, but deterministic and
/// content-dependent, which is enough for lexical retrieval without any
/// model download.
#[derive(Debug)]
pub struct HashedProvider {
    dimensions: usize,
    model: String,
}

impl HashedProvider {
    /// Create a hashed provider with the given output dimension.
    pub fn new(dimensions: usize, model: impl Into<String>) -> AppResult<Self> {
        if dimensions == 0 {
            return Err(AppError::Config(
                "Hashed embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            dimensions,
            model: model.into(),
        })
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !is_stop_word(w))
            .map(str::to_string)
            .collect()
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        // Ordered so colliding buckets always accumulate in the same order.
        let mut word_freq: BTreeMap<String, u32> = BTreeMap::new();
        for word in self.tokens(text) {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            embedding[self.bucket(WORD_SEED, word)] += *freq as f32;

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for trigram in padded.windows(3) {
                let trigram: String = trigram.iter().collect();
                embedding[self.bucket(TRIGRAM_SEED, &trigram)] += (*freq as f32).sqrt();
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }

    fn bucket(&self, seed: u64, feature: &str) -> usize {
        let hash = feature
            .bytes()
            .fold(seed, |acc, b| (acc ^ b as u64).wrapping_mul(FNV_PRIME));
        (hash % self.dimensions as u64) as usize
    }
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|stop| *stop == word)
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashedProvider {
    fn provider_name(&self) -> &str {
        "hashed"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_embedding(text))
            .collect())
    }
}

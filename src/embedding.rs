//! Text embedding seam for backends.
//!
//! Embedding model inference is out of scope for this crate: backends that
//! need to embed text (to index documents or to run a nearest-neighbor
//! query) accept any [`TextEmbedder`]. The bundled [`HashingEmbedder`] is a
//! deterministic feature-hashed bag of words, good enough for exercising
//! the store end-to-end without downloading a model; production callers
//! inject a real model behind the same trait.

use crate::errors::Error;

/// Produces fixed-dimension embeddings for text.
pub trait TextEmbedder: Send {
    /// Embedding dimensionality; every returned vector has this length.
    fn dims(&self) -> usize;

    /// Embed a piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, Error>;
}

/// Deterministic feature-hashing embedder.
///
/// Tokenizes on non-alphanumeric boundaries, lowercases, hashes each token
/// into one of `dims` buckets (FNV-1a, so vectors are stable across
/// processes and releases), counts occurrences, and L2-normalizes. All
/// components are non-negative, so cosine similarity between any two
/// embeddings lies in [0, 1] and distance `1 - cos` stays in [0, 1].
pub struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    /// Create an embedder with the given dimensionality.
    ///
    /// # Errors
    ///
    /// Returns `Error::Embedding` if `dims` is zero.
    pub fn new(dims: usize) -> Result<Self, Error> {
        if dims == 0 {
            return Err(Error::Embedding(
                "embedding dimensionality must be non-zero".to_string(),
            ));
        }
        Ok(Self { dims })
    }
}

/// FNV-1a, 64-bit. Stable across platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl TextEmbedder for HashingEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let mut vector = vec![0.0f32; self.dims];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let bucket = (fnv1a(token.as_bytes()) % self.dims as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }
}

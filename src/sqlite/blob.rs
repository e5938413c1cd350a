//! Embedding BLOB conversion and cosine similarity computation.

use crate::errors::Error;

/// Convert an embedding vector to a BLOB (little-endian f32 bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|&x| x.to_le_bytes()).collect()
}

/// Convert a BLOB back to an embedding vector of the expected
/// dimensionality.
///
/// # Errors
///
/// Returns `Error::InvalidBlobSize` if the blob length is not `dims * 4`.
pub fn blob_to_vec(blob: &[u8], dims: usize) -> Result<Vec<f32>, Error> {
    let expected = dims * 4;
    if blob.len() != expected {
        return Err(Error::InvalidBlobSize {
            expected,
            actual: blob.len(),
        });
    }
    let mut vec = Vec::with_capacity(dims);
    for chunk in blob.chunks_exact(4) {
        vec.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(vec)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Zero-norm vectors yield 0.0 rather than an error, so empty documents
/// simply never match anything.
///
/// # Errors
///
/// - `Error::MismatchedDimensions` if the vectors differ in length.
/// - `Error::Embedding` if either vector is empty or contains NaN or
///   infinite values.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, Error> {
    if a.is_empty() || b.is_empty() {
        return Err(Error::Embedding(
            "cannot compute similarity with an empty vector".to_string(),
        ));
    }
    if a.len() != b.len() {
        return Err(Error::MismatchedDimensions {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err(Error::Embedding(
            "vector contains NaN or infinite values".to_string(),
        ));
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

/// Normalized distance from cosine similarity: 0.0 identical, 1.0
/// maximally dissimilar. Similarities below zero clamp to distance 1.0.
pub fn cosine_distance(similarity: f64) -> f64 {
    (1.0 - similarity).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_round_trip() {
        let original = vec![0.123f32; 64];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), 256);
        let decoded = blob_to_vec(&blob, 64).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_blob_wrong_size() {
        let blob = vec![0u8; 10];
        assert!(matches!(
            blob_to_vec(&blob, 64),
            Err(Error::InvalidBlobSize { .. })
        ));
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0f32; 16];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let mut a = vec![0.0f32; 16];
        let mut b = vec![0.0f32; 16];
        a[0] = 1.0;
        b[1] = 1.0;
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_empty_vector() {
        assert!(cosine_similarity(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_cosine_mismatched_dims() {
        let a = vec![1.0f32; 8];
        let b = vec![1.0f32; 16];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(Error::MismatchedDimensions { .. })
        ));
    }

    #[test]
    fn test_cosine_nan() {
        let mut a = vec![1.0f32; 8];
        a[0] = f32::NAN;
        let b = vec![1.0f32; 8];
        assert!(cosine_similarity(&a, &b).is_err());
    }

    #[test]
    fn test_cosine_zero_norm() {
        let zero = vec![0.0f32; 8];
        let v = vec![1.0f32; 8];
        assert_eq!(cosine_similarity(&zero, &v).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_clamped() {
        assert_eq!(cosine_distance(1.0), 0.0);
        assert_eq!(cosine_distance(0.0), 1.0);
        assert_eq!(cosine_distance(-0.5), 1.0);
    }
}

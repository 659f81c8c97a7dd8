/// Calculate cosine similarity directly between two vectors
///
/// # Arguments
/// * `vec1` - First vector
/// * `vec2` - Second vector
///
/// # Returns
/// * `f64` - The cosine similarity, or 0.0 when the vectors have different
///   dimensions, are empty, or either has zero magnitude
pub fn cosine_similarity(vec1: &[f32], vec2: &[f32]) -> f64 {
    if vec1.len() != vec2.len() || vec1.is_empty() {
        return 0.0;
    }

    let mag1: f64 = vec1.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
    let mag2: f64 = vec2.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();

    if mag1 == 0.0 || mag2 == 0.0 || !mag1.is_finite() || !mag2.is_finite() {
        return 0.0;
    }

    let dot_product: f64 = vec1
        .iter()
        .zip(vec2.iter())
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum();

    (dot_product / (mag1 * mag2)).clamp(-1.0, 1.0)
}

/// Rejects empty vectors and vectors with non-finite components. A zero
/// vector is kept; it scores a cosine of 0.
pub fn is_usable_vector(vector: &[f32]) -> bool {
    !vector.is_empty() && vector.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_orthogonal() {
        let a = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_degenerate_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = [0.3, -0.7, 0.1, 0.9];
        let b = [0.5, 0.2, -0.4, 0.6];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_usable_vector() {
        assert!(is_usable_vector(&[0.1, 0.2]));
        assert!(!is_usable_vector(&[]));
        assert!(is_usable_vector(&[0.0, 0.0]));
        assert!(!is_usable_vector(&[f32::NAN, 0.2]));
    }
}

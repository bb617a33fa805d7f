//! Vector math over item embeddings.
//!
//! Nothing here panics on malformed vectors. Mismatched, empty or
//! degenerate input scores as unrelated (0.0).

/// Cosine of the angle between `a` and `b`, clamped to [-1, 1].
///
/// Zero when lengths differ, either side is empty, or either norm is zero or
/// not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, sq_a, sq_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, sa, sb), (x, y)| {
            (dot + x * y, sa + x * x, sb + y * y)
        });
    let denom = sq_a.sqrt() * sq_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

/// Scale `v` to unit length. Zero vectors are left alone.
pub fn normalize(v: &mut [f32]) {
    let magnitude = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        v.iter_mut().for_each(|x| *x /= magnitude);
    }
}

/// Symmetric `1 - cosine` matrix with a zero diagonal.
pub fn pairwise_distances(vectors: &[Vec<f32>]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    let mut matrix = vec![vec![0.0f64; n]; n];
    for (i, a) in vectors.iter().enumerate() {
        for (j, b) in vectors.iter().enumerate().skip(i + 1) {
            let d = 1.0 - f64::from(cosine_similarity(a, b));
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

use thiserror::Error;

use crate::detection::domain::detected_face::DetectedFace;

/// Cosine-distance threshold below which two faces count as the same
/// identity. 1.0 is what the shipped pipeline uses; values down to 0.6 have
/// been run in earlier revisions. Lower is stricter.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 1.0;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Cosine distance (`1 - cosine similarity`) between two embeddings.
///
/// A dimension mismatch means the two embeddings came from different
/// recognition models, which is a configuration error, not a per-face
/// condition. A zero-norm embedding is treated as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Ok(1.0);
    }
    Ok(1.0 - dot / denom)
}

/// True iff the two faces' embedding distance is strictly below `threshold`.
pub fn matches(a: &DetectedFace, b: &DetectedFace, threshold: f64) -> Result<bool, MatchError> {
    Ok(cosine_distance(&a.embedding, &b.embedding)? < threshold)
}

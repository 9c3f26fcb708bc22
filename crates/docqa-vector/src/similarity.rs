pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product; equals cosine similarity when both inputs are unit length.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn is_unit(v: &[f32], tolerance: f32) -> bool {
    (l2_norm(v) - 1.0).abs() <= tolerance
}

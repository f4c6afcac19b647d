//! Dense vector math shared by corpus normalization and the KNN engine.
//!
//! Sums accumulate in `f64` so large finite components do not overflow
//! before the final narrowing to `f32`.

/// Dense feature vector extracted from one key frame.
pub type FeatureVector = Vec<f32>;

pub fn l2_norm(v: &[f32]) -> f32 {
    norm_f64(v) as f32
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum::<f64>() as f32
}

/// L2 norm of the element-wise difference.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

fn norm_f64(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = norm_f64(v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x = (f64::from(*x) / norm) as f32);
    }
}

/// Unit-length copy of `v`.
pub fn normalized(v: &[f32]) -> FeatureVector {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Compute the magnitude (L2 norm) of a vector.
pub fn compute_magnitude(embedding: &[f32]) -> f64 {
	let mut sum: f64 = 0.0;
	for &v in embedding {
		let vf = v as f64;
		sum += vf * vf;
	}
	sum.sqrt()
}

/// Scale a vector in place to unit length. Zero vectors are left untouched.
pub fn normalize_l2(embedding: &mut [f32]) {
	let mag = compute_magnitude(embedding);
	if mag == 0.0 || !mag.is_finite() {
		return;
	}
	for v in embedding.iter_mut() {
		*v = (*v as f64 / mag) as f32;
	}
}

/// Inner product of two equal-length vectors, accumulated in f64.
/// Returns 0.0 for dimension mismatches or non-finite results.
pub fn inner_product(a: &[f32], b: &[f32]) -> f64 {
	if a.len() != b.len() {
		return 0.0;
	}
	let mut dot: f64 = 0.0;
	for (x, y) in a.iter().zip(b.iter()) {
		dot += (*x as f64) * (*y as f64);
	}
	if !dot.is_finite() {
		return 0.0;
	}
	dot
}

/// Compute cosine similarity between two f32 vectors.
/// Returns 0.0 for zero-magnitude vectors or dimension mismatches.
/// Result clamped to [-1.0, 1.0].
#[cfg(test)]
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}
	let denom = compute_magnitude(a) * compute_magnitude(b);
	if denom == 0.0 {
		return 0.0;
	}
	let result = inner_product(a, b) / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_vectors() {
		let v = vec![1.0f32, 2.0, 3.0];
		let sim = cosine_similarity(&v, &v);
		assert!((sim - 1.0).abs() < 1e-10);
	}

	#[test]
	fn orthogonal_vectors() {
		let a = vec![1.0f32, 0.0];
		let b = vec![0.0f32, 1.0];
		assert!((cosine_similarity(&a, &b)).abs() < 1e-10);
	}

	#[test]
	fn mismatched_lengths() {
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
		assert_eq!(inner_product(&[1.0], &[1.0, 2.0]), 0.0);
	}

	#[test]
	fn magnitude_basic() {
		let v = vec![3.0f32, 4.0];
		assert!((compute_magnitude(&v) - 5.0).abs() < 1e-10);
	}

	#[test]
	fn normalize_makes_unit_length() {
		let mut v = vec![3.0f32, 4.0];
		normalize_l2(&mut v);
		assert!((compute_magnitude(&v) - 1.0).abs() < 1e-6);
		assert!((v[0] - 0.6).abs() < 1e-6);
		assert!((v[1] - 0.8).abs() < 1e-6);
	}

	#[test]
	fn normalize_leaves_zero_vector() {
		let mut v = vec![0.0f32, 0.0, 0.0];
		normalize_l2(&mut v);
		assert_eq!(v, vec![0.0, 0.0, 0.0]);
	}

	#[test]
	fn inner_product_of_unit_vectors_matches_cosine() {
		let mut a = vec![1.0f32, 2.0, 2.0];
		let mut b = vec![2.0f32, 1.0, 0.5];
		let expected = cosine_similarity(&a, &b);
		normalize_l2(&mut a);
		normalize_l2(&mut b);
		assert!((inner_product(&a, &b) - expected).abs() < 1e-6);
	}
}

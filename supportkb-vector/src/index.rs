// ---------------------------------------------------------------------------
// FlatIndex: exact inner-product search
// ---------------------------------------------------------------------------
//
// Vectors are stored row-major in one contiguous buffer. Row position is the
// surrogate key into the article metadata table. Search scans every row, so
// recall is exact; at knowledge-base scale (thousands of rows) this is a few
// microseconds per query.
// ---------------------------------------------------------------------------

use crate::cosine::inner_product;
use crate::embedding::batch_dimension;
use crate::error::VectorError;
use crate::types::Lookup;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
	dimension: usize,
	data: Vec<f32>,
}

impl FlatIndex {
	/// Create an empty index for vectors of `dimension` components.
	pub fn new(dimension: usize) -> Result<Self, VectorError> {
		if dimension == 0 {
			return Err(VectorError::InvalidConfig(
				"Index dimension must be positive".into(),
			));
		}
		Ok(Self {
			dimension,
			data: Vec::new(),
		})
	}

	/// Build an index over `vectors` in order. An empty set is rejected so a
	/// build can never silently produce a zero-length index.
	pub fn build(vectors: &[Vec<f32>]) -> Result<Self, VectorError> {
		if vectors.is_empty() {
			return Err(VectorError::Schema(
				"Cannot build an index from zero vectors".into(),
			));
		}
		let dimension = batch_dimension(vectors)?;
		let mut index = Self::new(dimension)?;
		for v in vectors {
			index.add(v)?;
		}
		Ok(index)
	}

	/// Append one vector as the next row.
	pub fn add(&mut self, vector: &[f32]) -> Result<usize, VectorError> {
		if vector.len() != self.dimension {
			return Err(VectorError::DimensionMismatch {
				expected: self.dimension,
				actual: vector.len(),
			});
		}
		self.data.extend_from_slice(vector);
		Ok(self.len() - 1)
	}

	pub fn dimension(&self) -> usize {
		self.dimension
	}

	pub fn len(&self) -> usize {
		self.data.len() / self.dimension
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
		self.data.chunks_exact(self.dimension)
	}

	/// Top-`k` rows by descending inner product with `query`.
	///
	/// Returns `min(k, len)` hits. Ties keep row order.
	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Lookup>, VectorError> {
		if query.len() != self.dimension {
			return Err(VectorError::DimensionMismatch {
				expected: self.dimension,
				actual: query.len(),
			});
		}

		let mut hits: Vec<Lookup> = self
			.rows()
			.enumerate()
			.map(|(row, v)| Lookup {
				row,
				score: inner_product(query, v),
			})
			.collect();

		hits.sort_by(|a, b| {
			b.score
				.partial_cmp(&a.score)
				.unwrap_or(std::cmp::Ordering::Equal)
		});
		hits.truncate(k);
		Ok(hits)
	}
}

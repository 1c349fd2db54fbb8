use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Dense row-major embedding matrix, one row per catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dim: usize,
    rows: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Builds a matrix from rows, rejecting ragged input
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let count = rows.len();
        let mut data = Vec::with_capacity(dim * count);

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(AppError::Schema(format!(
                    "embedding row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    dim
                )));
            }
            data.extend(row);
        }

        Ok(Self {
            dim,
            rows: count,
            data,
        })
    }

    /// Number of columns
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row for `index`, or `None` when out of range
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).map(move |i| &self.data[i * self.dim..(i + 1) * self.dim])
    }

    /// Vertically stacks matrices with the same column count
    pub fn vstack(parts: Vec<EmbeddingMatrix>) -> AppResult<Self> {
        let rows: Vec<Vec<f32>> = parts
            .iter()
            .flat_map(|part| part.iter_rows().map(<[f32]>::to_vec))
            .collect();
        Self::from_rows(rows)
    }

    /// Loads a matrix serialised as a JSON array of rows
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::MissingInput(format!(
                "embedding artifact not found: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path)?;
        let rows: Vec<Vec<f32>> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Schema(format!(
                "{} is not a JSON matrix of numbers: {}",
                path.display(),
                e
            ))
        })?;

        let matrix = Self::from_rows(rows)?;
        tracing::info!(
            path = %path.display(),
            rows = matrix.rows(),
            dim = matrix.dim(),
            "Loaded embedding matrix"
        );
        Ok(matrix)
    }

    /// Writes the matrix as a JSON array of rows
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let rows: Vec<&[f32]> = self.iter_rows().collect();
        let json = serde_json::to_string(&rows)
            .map_err(|e| AppError::Internal(format!("matrix serialization error: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }
}

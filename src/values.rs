//! Random batch generation

use crate::error::{AppError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An ordered, non-empty sequence of integers to be sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerBatch {
    values: Vec<i32>,
}

impl IntegerBatch {
    /// Wrap caller-provided values; an empty batch is rejected
    pub fn new(values: Vec<i32>) -> Result<Self> {
        if values.is_empty() {
            return Err(AppError::validation("Integer batch cannot be empty"));
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<i32> {
        self.values
    }
}

/// Pseudo-random source of batch values
pub struct ValueSource {
    rng: StdRng,
}

impl ValueSource {
    /// Seeded sources produce the same batch on every run
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Produce exactly `count` uniformly distributed `i32` values
    pub fn generate(&mut self, count: usize) -> Result<IntegerBatch> {
        if count == 0 {
            return Err(AppError::validation("Number of values must be greater than 0"));
        }
        let values: Vec<i32> = (0..count).map(|_| self.rng.gen()).collect();
        IntegerBatch::new(values)
    }
}

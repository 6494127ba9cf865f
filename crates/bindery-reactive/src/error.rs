use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    #[error("index {index} out of bounds for observable vec of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("computed value read itself while recomputing")]
    CyclicRead,
}

impl ReactiveError {
    #[must_use]
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
}

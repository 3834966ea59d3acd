//! Arena lifecycle errors.

use thiserror::Error;

use skyram_core::world::UnitId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("controller pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),
}

//! Bounded, newest-first history of past analyses kept in client-local
//! key/value storage.

pub mod storage;
pub mod store;

pub use storage::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage slot name: {0:?}")]
    InvalidSlot(String),

    #[error("Internal lock error")]
    LockPoisoned,
}

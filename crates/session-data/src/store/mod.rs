mod error;
mod file_store;

pub use error::{Result, StoreError};
pub use file_store::FileStore;

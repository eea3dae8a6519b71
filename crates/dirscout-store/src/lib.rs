//! Append-only CSV record stores and the on-disk data layout.

pub mod csv_store;
pub mod error;
pub mod history;
pub mod layout;

pub use csv_store::{append_row, read_all};
pub use error::StoreError;
pub use history::HistorySet;
pub use layout::{DataLayout, FileKind};

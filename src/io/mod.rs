//! Adapters between files on disk and the in-memory [`Table`](crate::model::Table).

pub mod csv_read;
pub mod discover;
pub mod excel_read;
pub mod excel_write;

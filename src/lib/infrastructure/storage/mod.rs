//! Local persistence for generated images and task history

pub mod error;
pub mod history;
pub mod output;

pub use error::StorageError;
pub use history::{
    FailedPage, HistoryRecord, HistoryStore, HistorySummary, PageImage, TaskStatus, is_valid_id,
};
pub use output::OutputStore;

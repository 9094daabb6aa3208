use crate::config::ConfigError;
use crate::infrastructure::model::ModelError;
use crate::infrastructure::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no pages to generate")]
    NoPages,
    #[error("page index {0} appears more than once")]
    DuplicatePage(usize),
    #[error("invalid task id '{0}'")]
    InvalidTaskId(String),
    #[error("task '{0}' not found")]
    TaskNotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GenerateError {
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::NoPages => {
                "The outline has no pages. Generate an outline first.".to_string()
            }
            GenerateError::DuplicatePage(index) => format!(
                "Page index {index} is used by more than one page. \
                 Give every page its own index."
            ),
            GenerateError::InvalidTaskId(id) => {
                format!("Task id '{id}' may only contain letters, digits and '-'.")
            }
            GenerateError::TaskNotFound(id) => format!("Task '{id}' does not exist."),
            GenerateError::Config(err) => err.user_message(),
            GenerateError::Model(err) => err.user_message(),
            GenerateError::Storage(err) => format!("Could not save the image: {err}"),
        }
    }
}

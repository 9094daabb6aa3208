use crate::config::ConfigError;
use crate::infrastructure::model::ModelError;
use crate::infrastructure::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl OutlineError {
    pub fn user_message(&self) -> String {
        match self {
            OutlineError::EmptyTopic => "Please enter a topic for the post.".to_string(),
            OutlineError::Config(err) => err.user_message(),
            OutlineError::Model(err) => err.user_message(),
            OutlineError::Storage(err) => format!("Could not save the outline: {err}"),
        }
    }
}

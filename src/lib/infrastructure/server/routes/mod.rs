pub mod config;
pub mod generate;
pub mod health;
pub mod history;
pub mod images;
pub mod outline;

pub mod image;
pub mod model;
pub mod server;
pub mod storage;

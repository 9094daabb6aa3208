mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::ErrorResponse;
pub use error::ServerError;
pub use router::build_router;
pub use state::ServerState;

use crate::config::AppSettings;
use std::net::SocketAddr;

pub async fn serve(settings: AppSettings, addr: SocketAddr) -> Result<(), ServerError> {
    router::serve(settings, addr).await
}

mod handlers;
mod routes;
mod types;

#[cfg(test)]
mod test_helpers;

pub use routes::{create_router, AppState};
pub use types::{ApiError, SendResponse, StatusResponse};

mod router;
mod state;

pub use router::{HealthResponse, build_router};
pub use state::AppState;

pub mod handlers;
pub mod logging;
pub mod server;
pub mod sse;
pub mod state;

pub use server::{app_config, run_server};
pub use state::{load_providers_config, AppState, ServerConfig, StreamRegistration};

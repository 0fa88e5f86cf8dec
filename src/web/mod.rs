//! Web gateway: the HTTP API the browser UI and the CLI invokers talk to.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod types;
pub mod validate;

pub use self::error::{ApiError, Operation};
pub use self::server::{GatewayState, RunningServer, build_router, start_server};

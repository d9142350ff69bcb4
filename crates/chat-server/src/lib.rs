//! Server half of the chat app: the `/api/chat` endpoint, the demo quota
//! tracker, and the adapters they talk to.

pub mod config;
pub mod ports;
pub mod quota;
pub mod endpoint;
pub mod model;
pub mod history;
pub mod identity;
pub mod state;
pub mod http;


pub use endpoint::ChatEndpoint;
pub use quota::{InMemoryQuotaCounter, QuotaTracker};
pub use state::AppState;

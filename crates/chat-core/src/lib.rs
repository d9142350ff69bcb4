//! Client side of the chat: the session store that owns every conversation
//! the UI can see, and the protocol client that drives `/api/chat`.

pub mod ports;
pub mod event_bus;
pub mod session_store;
pub mod client;

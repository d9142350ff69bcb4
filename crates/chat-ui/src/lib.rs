//! egui rendering for the chat. Panels read the session store and a small
//! [`state::UiState`] projection of client events; they never talk to the
//! network themselves.

pub mod panels;
pub mod state;
pub mod theme;

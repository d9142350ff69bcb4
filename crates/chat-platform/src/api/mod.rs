pub mod fetch;

pub use fetch::FetchChatApi;

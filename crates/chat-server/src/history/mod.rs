pub mod memory;
pub mod firestore;

pub use memory::InMemoryHistoryStore;
pub use firestore::FirestoreHistoryStore;

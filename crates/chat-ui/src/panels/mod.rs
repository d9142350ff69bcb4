pub mod chat;
pub mod notices;
pub mod sidebar;

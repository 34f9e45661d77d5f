pub mod chat;
pub mod toast;

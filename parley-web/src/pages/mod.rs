mod chat;
mod layout;

pub use chat::Chat;
pub use layout::AppLayout;

pub mod store;
pub mod sweeper;

pub use store::{SessionData, SessionStore, SharedSessionStore};
pub use sweeper::start_session_sweeper;

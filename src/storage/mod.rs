pub mod db;
pub mod progress;
pub mod sessions;

pub use db::Database;
pub use progress::ProgressStore;
pub use sessions::{SessionRecord, SessionStore, StudyStreak};

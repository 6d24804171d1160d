pub mod belief;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use belief::*;
pub use config::{validate_window_days, Config, LogFormat, MAX_TIMELINE_WINDOW_DAYS};
pub use error::PharmaSignalError;
pub use store::{DrugSnapshot, MentionStore};
pub use types::*;

pub mod account;
pub mod config;
pub mod error;
pub mod io;
pub mod metrics;
pub mod password;
pub mod paths;
pub mod platform;
pub mod rate_limit;
pub mod report;
pub mod role;
pub mod session;
pub mod standup;
pub mod store;
pub mod team;
pub mod types;

pub use error::{Result, TechDevError};
pub use platform::Platform;
pub use session::Session;

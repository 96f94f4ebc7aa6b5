pub mod attendance;
pub mod core;
pub mod fetch;
pub mod reports;
pub mod rosters;
pub mod session;

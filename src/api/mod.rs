pub mod attendance;
pub mod report;

pub mod attendance;
pub mod grade;
pub mod report;
pub mod role;
pub mod student;
pub mod submission;
pub mod teacher;

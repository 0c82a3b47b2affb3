pub mod clock;
pub mod compiler;
pub mod mailer;
pub mod recorder;
pub mod render;
pub mod report;
pub mod scheduler;

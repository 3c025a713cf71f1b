pub mod config;
pub mod schedule;
pub mod session;
pub mod task;
pub mod workspace;

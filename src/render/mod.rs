pub mod backend;
pub mod export;
pub mod job;
pub mod scheduler;

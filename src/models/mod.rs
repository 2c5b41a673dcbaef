pub mod assignment;
pub mod blocked_time;
pub mod crew;
pub mod job;
pub mod proposal;
pub mod service;
pub mod window;
pub mod worker;

pub mod availability;
pub mod conflicts;
pub mod proposal;
pub mod scoring;

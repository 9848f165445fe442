pub mod dashboard;
pub mod follow_up;
pub mod lead;

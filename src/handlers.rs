pub mod dashboard;
pub mod follow_ups;
pub mod health;
pub mod leads;

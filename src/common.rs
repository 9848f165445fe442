pub mod error;
pub mod naming;

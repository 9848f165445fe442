pub mod store;
pub use store::LeadStore;
pub mod local_store;
pub use local_store::LocalLeadStore;
pub mod pg_store;
pub use pg_store::PgLeadStore;

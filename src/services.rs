pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod follow_up_service;
pub use follow_up_service::FollowUpService;
pub mod lead_service;
pub use lead_service::LeadService;

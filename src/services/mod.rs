pub mod auth;
pub mod events;
pub mod reports;
pub mod reviews;
pub mod system;
pub mod teams;
pub mod workflow;

pub use auth::AuthService;
pub use events::EventService;
pub use reports::ReportService;
pub use reviews::ReviewService;
pub use system::SystemService;
pub use teams::TeamService;
pub use workflow::WorkflowService;

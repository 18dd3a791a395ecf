pub mod auth;

pub mod events;

pub mod teams;

pub mod reviews;

pub mod workflow;

pub mod system;

pub use auth::configure_auth_routes;
pub use events::configure_events_routes;
pub use reviews::configure_reviews_routes;
pub use system::configure_system_routes;
pub use teams::configure_teams_routes;
pub use workflow::configure_workflow_routes;

pub mod rate_limit;
pub mod require_admin;

pub use rate_limit::RateLimit;
pub use require_admin::RequireAdmin;

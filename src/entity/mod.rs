pub mod evaluation_events;
pub mod prelude;
pub mod review_sessions;
pub mod reviews;
pub mod students;
pub mod teams;

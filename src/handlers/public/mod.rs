// Public handlers: no token required
pub mod auth;
pub mod companies;
pub mod jobs;

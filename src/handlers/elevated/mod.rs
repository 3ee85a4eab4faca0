// Elevated handlers: admin token required
pub mod companies;
pub mod jobs;
pub mod users;

// Protected handlers: token for the user named in the path, or an admin token
pub mod users;

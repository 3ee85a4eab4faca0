// handlers/mod.rs - three access tiers
//
// Public (no token) → Protected (token for the user named in the path, or admin)
// → Elevated (admin token)
pub mod public;
pub mod protected;
pub mod elevated;
pub mod utils;

pub mod company;
pub mod job;
pub mod patch;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyNew, CompanyUpdate};
pub use job::{Job, JobDetail, JobNew, JobSummary, JobUpdate};
pub use user::{User, UserAuth, UserDetail, UserNew, UserUpdate};

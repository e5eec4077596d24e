pub mod submission;
pub mod user;
pub mod word;

pub use submission::{Submission, SubmissionSummary};
pub use user::{SessionUser, User};
pub use word::WordRow;

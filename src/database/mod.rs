pub mod manager;
pub mod models;
pub mod query_builder;
pub mod submissions;
pub mod users;
pub mod words;

pub use manager::{DatabaseError, DatabaseManager};
pub use submissions::SubmissionRepository;
pub use users::{UserError, UserRepository};
pub use words::{GroupImport, WordRepository};

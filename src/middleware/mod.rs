pub mod auth;
pub mod context;
pub mod response;

pub use auth::{is_user_id, must_login, require_numeric_id, CurrentUser};
pub use context::{inject_context, Db};
pub use response::{ApiResponse, ApiResult};

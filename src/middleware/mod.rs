pub mod auth;
pub mod response;

pub use auth::{auth_middleware, policy_for, AuthPolicy, CurrentUser, Viewer};
pub use response::{ApiResponse, ApiResult};

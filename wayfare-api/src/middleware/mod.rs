pub mod auth;
pub mod rate_limit;

pub use auth::{issue_token, AdminUser, AuthUser, Claims, MaybeAuthUser};
pub use rate_limit::rate_limit_middleware;

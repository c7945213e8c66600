//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文 (认证中间件注入)
//! - [`require_auth`] - 认证中间件
//! - [`AuthorizationPolicy`] - 授权策略，每个核心操作开头显式调用

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod policy;

pub use jwt::{Claims, ClaimsError, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use policy::{ActingUser, Action, AuthorizationPolicy, PolicyDenial};

//! API 路由模块
//!
//! Handler 只负责提取参数、调用核心服务、包装结果，不包含业务规则。
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (无需认证)
//! - [`me`] - 当前用户、可填工时类型、通知
//! - [`timesheets`] - 本人工时表
//! - [`review`] - 审核队列与审批
//! - [`pay_periods`] - 发薪周期 (管理员)
//! - [`users`] - 用户管理 (管理员)

pub mod health;
pub mod me;
pub mod pay_periods;
pub mod review;
pub mod timesheets;
pub mod users;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_auth;
use crate::core::ServerState;

/// multipart 边界和表单字段的额外空间
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// 所有路由 (未绑定状态)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        .merge(me::router())
        .merge(timesheets::router())
        .merge(review::router())
        .merge(pay_periods::router())
        .merge(users::router())
}

/// Build a fully configured application with all middleware and state
///
/// HTTP 服务器和集成测试 (oneshot) 共用
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // JWT 认证中间件 - require_auth 内部会跳过非 /api/ 路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes + MULTIPART_OVERHEAD,
        ))
        .layer(ConcurrencyLimitLayer::new(state.config.max_connections))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

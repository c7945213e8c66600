//! 用户管理
//!
//! 登录 / OAuth 不在本服务内，用户由管理员创建，身份来自 JWT。

use shared::models::{HourTypeInfo, Notification, Role, User, UserCreate, UserSettingsUpdate};
use sqlx::SqlitePool;

use crate::auth::{ActingUser, Action, AuthorizationPolicy};
use crate::db::repository::{RepoError, notification, user};
use crate::utils::validation::{MAX_NAME_LEN, validate_email, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 通知列表条数上限
const NOTIFICATION_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct UserService {
    pool: SqlitePool,
    policy: AuthorizationPolicy,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            policy: AuthorizationPolicy,
        }
    }

    pub async fn create_user(&self, actor: &ActingUser, data: &UserCreate) -> AppResult<User> {
        self.policy.check(actor, Action::ManageUsers)?;
        validate_email(&data.email)?;
        validate_required_text(&data.display_name, "display_name", MAX_NAME_LEN)?;

        let created = user::create(&self.pool, data).await.map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::UserEmailExists)
                .with_detail("email", data.email.trim().to_lowercase()),
            other => other.into(),
        })?;

        tracing::info!(
            user_id = created.id,
            role = %data.role,
            actor_id = actor.id,
            "User created"
        );
        Ok(created)
    }

    pub async fn list_users(&self, actor: &ActingUser) -> AppResult<Vec<User>> {
        self.policy.check(actor, Action::ManageUsers)?;
        Ok(user::find_all(&self.pool).await?)
    }

    /// 修改角色 (同时把旧别名改写为标准名)
    pub async fn update_role(&self, actor: &ActingUser, id: i64, role: Role) -> AppResult<User> {
        self.policy.check(actor, Action::ManageUsers)?;

        let updated = user::update_role(&self.pool, id, role)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => user_not_found(id),
                other => other.into(),
            })?;

        crate::security_log!(
            "INFO",
            "role_changed",
            user_id = id,
            role = role.as_str(),
            actor_id = actor.id
        );
        Ok(updated)
    }

    pub async fn me(&self, actor: &ActingUser) -> AppResult<User> {
        user::find_by_id(&self.pool, actor.id)
            .await?
            .ok_or_else(|| user_not_found(actor.id))
    }

    /// 本人设置: 目前只有通知开关
    pub async fn update_settings(
        &self,
        actor: &ActingUser,
        data: &UserSettingsUpdate,
    ) -> AppResult<User> {
        let updated = user::update_notifications(&self.pool, actor.id, data.notifications_enabled)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => user_not_found(actor.id),
                other => other.into(),
            })?;

        tracing::info!(
            user_id = actor.id,
            notifications_enabled = data.notifications_enabled,
            "User settings updated"
        );
        Ok(updated)
    }

    /// 当前角色可填的工时类型及其属性
    pub fn allowed_hour_types(&self, actor: &ActingUser) -> Vec<HourTypeInfo> {
        AuthorizationPolicy::allowed_hour_types(actor.role)
            .iter()
            .copied()
            .map(HourTypeInfo::from)
            .collect()
    }

    /// 本人的通知 outbox，最新在前
    pub async fn list_notifications(&self, actor: &ActingUser) -> AppResult<Vec<Notification>> {
        Ok(notification::find_by_user(&self.pool, actor.id, NOTIFICATION_LIMIT).await?)
    }
}

fn user_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("user_id", id)
}

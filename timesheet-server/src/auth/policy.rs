//! 授权策略
//!
//! 每个核心操作在开头调用 [`AuthorizationPolicy::check`]，得到类型化的
//! 拒绝原因 [`PolicyDenial`]，再映射为对应的错误码。
//!
//! # 规则
//!
//! | 角色 | 可填工时类型 | 可审批角色 |
//! |------|-------------|-----------|
//! | trainee | Training | - |
//! | internal | Internal, PTO, Holiday, Unpaid | - |
//! | engineer | Field, PTO, Holiday, Unpaid | - |
//! | approver | 全部 | trainee, engineer |
//! | admin | 全部 | 全部 |

use shared::models::{HourType, Role};
use thiserror::Error;

use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// 执行操作的用户 (显式传入每个核心操作)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: i64,
    pub role: Role,
}

/// 需要授权的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 查看自己的工时表
    ViewOwn { owner_id: i64 },
    /// 修改自己的工时表 (编辑、提交、删除、上传附件)
    EditOwn { owner_id: i64 },
    /// 填写某类工时
    LogHours { hour_type: HourType },
    /// 查看审核队列
    ListReview,
    /// 审核某角色用户的工时表 (批准、退回、撤销批准、管理员备注)
    Review { owner_role: Role },
    /// 追加历史备注: 本人或有审批权的审核人
    AddNote { owner_id: i64, owner_role: Role },
    ManagePayPeriods,
    ManageUsers,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::ViewOwn { .. } => "view_own",
            Action::EditOwn { .. } => "edit_own",
            Action::LogHours { .. } => "log_hours",
            Action::ListReview => "list_review",
            Action::Review { .. } => "review",
            Action::AddNote { .. } => "add_note",
            Action::ManagePayPeriods => "manage_pay_periods",
            Action::ManageUsers => "manage_users",
        }
    }
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyDenial {
    /// 非本人访问: 按不存在处理，不泄露工时表是否存在
    #[error("timesheet belongs to another user")]
    NotOwner,

    #[error("role {role} may not log {hour_type} hours")]
    HourTypeNotAllowed { role: Role, hour_type: HourType },

    #[error("approver or admin role required")]
    ReviewerRequired,

    #[error("role {actor} may not review timesheets of role {owner}")]
    CannotReviewRole { actor: Role, owner: Role },

    #[error("admin role required")]
    AdminRequired,
}

impl From<PolicyDenial> for AppError {
    fn from(denial: PolicyDenial) -> Self {
        match denial {
            PolicyDenial::NotOwner => AppError::new(ErrorCode::TimesheetNotFound),
            PolicyDenial::HourTypeNotAllowed { role, hour_type } => {
                AppError::with_message(ErrorCode::HourTypeNotAllowed, denial.to_string())
                    .with_detail("role", role.as_str())
                    .with_detail("hour_type", hour_type.as_str())
            }
            PolicyDenial::ReviewerRequired => {
                AppError::with_message(ErrorCode::ReviewerRequired, denial.to_string())
            }
            PolicyDenial::CannotReviewRole { actor, owner } => {
                AppError::with_message(ErrorCode::CannotReviewRole, denial.to_string())
                    .with_detail("actor_role", actor.as_str())
                    .with_detail("owner_role", owner.as_str())
            }
            PolicyDenial::AdminRequired => {
                AppError::with_message(ErrorCode::AdminRequired, denial.to_string())
            }
        }
    }
}

const ALL_HOUR_TYPES: &[HourType] = &HourType::ALL;
const TRAINEE_HOUR_TYPES: &[HourType] = &[HourType::Training];
const INTERNAL_HOUR_TYPES: &[HourType] = &[
    HourType::Internal,
    HourType::Pto,
    HourType::Holiday,
    HourType::Unpaid,
];
const ENGINEER_HOUR_TYPES: &[HourType] = &[
    HourType::Field,
    HourType::Pto,
    HourType::Holiday,
    HourType::Unpaid,
];

/// 授权策略 (纯查表，无状态)
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    /// 角色可填的工时类型 (非空)
    pub fn allowed_hour_types(role: Role) -> &'static [HourType] {
        match role {
            Role::Trainee => TRAINEE_HOUR_TYPES,
            Role::Internal => INTERNAL_HOUR_TYPES,
            Role::Engineer => ENGINEER_HOUR_TYPES,
            Role::Approver | Role::Admin => ALL_HOUR_TYPES,
        }
    }

    /// 审批矩阵: admin → 任意角色; approver → trainee, engineer; 其他 → 无
    pub fn can_approve(actor_role: Role, target_role: Role) -> bool {
        match actor_role {
            Role::Admin => true,
            Role::Approver => matches!(target_role, Role::Trainee | Role::Engineer),
            Role::Trainee | Role::Internal | Role::Engineer => false,
        }
    }

    /// 审核队列中可见的角色; `None` 表示不限
    pub fn reviewable_roles(actor_role: Role) -> Option<Vec<Role>> {
        match actor_role {
            Role::Admin => None,
            _ => Some(
                Role::ALL
                    .into_iter()
                    .filter(|target| Self::can_approve(actor_role, *target))
                    .collect(),
            ),
        }
    }

    pub fn check(&self, actor: &ActingUser, action: Action) -> Result<(), PolicyDenial> {
        let result = Self::evaluate(actor, action);
        if let Err(denial) = &result
            && *denial != PolicyDenial::NotOwner
        {
            security_log!(
                "WARN",
                "policy_denied",
                actor_id = actor.id,
                actor_role = actor.role.as_str(),
                action = action.name(),
                reason = denial.to_string()
            );
        }
        result
    }

    fn evaluate(actor: &ActingUser, action: Action) -> Result<(), PolicyDenial> {
        match action {
            Action::ViewOwn { owner_id } | Action::EditOwn { owner_id } => {
                if actor.id == owner_id {
                    Ok(())
                } else {
                    Err(PolicyDenial::NotOwner)
                }
            }
            Action::LogHours { hour_type } => {
                if Self::allowed_hour_types(actor.role).contains(&hour_type) {
                    Ok(())
                } else {
                    Err(PolicyDenial::HourTypeNotAllowed {
                        role: actor.role,
                        hour_type,
                    })
                }
            }
            Action::ListReview => {
                if actor.role.is_reviewer() {
                    Ok(())
                } else {
                    Err(PolicyDenial::ReviewerRequired)
                }
            }
            Action::Review { owner_role } => {
                if !actor.role.is_reviewer() {
                    Err(PolicyDenial::ReviewerRequired)
                } else if Self::can_approve(actor.role, owner_role) {
                    Ok(())
                } else {
                    Err(PolicyDenial::CannotReviewRole {
                        actor: actor.role,
                        owner: owner_role,
                    })
                }
            }
            Action::AddNote {
                owner_id,
                owner_role,
            } => {
                if actor.id == owner_id || Self::can_approve(actor.role, owner_role) {
                    Ok(())
                } else {
                    Err(PolicyDenial::NotOwner)
                }
            }
            Action::ManagePayPeriods | Action::ManageUsers => {
                if actor.role == Role::Admin {
                    Ok(())
                } else {
                    Err(PolicyDenial::AdminRequired)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> ActingUser {
        ActingUser { id: 1, role }
    }

    #[test]
    fn test_allowed_hour_types_never_empty() {
        for role in Role::ALL {
            assert!(!AuthorizationPolicy::allowed_hour_types(role).is_empty());
        }
    }

    #[test]
    fn test_allowed_hour_types_table() {
        use HourType::*;
        assert_eq!(AuthorizationPolicy::allowed_hour_types(Role::Trainee), &[Training]);
        assert_eq!(
            AuthorizationPolicy::allowed_hour_types(Role::Internal),
            &[Internal, Pto, Holiday, Unpaid]
        );
        assert_eq!(
            AuthorizationPolicy::allowed_hour_types(Role::Engineer),
            &[Field, Pto, Holiday, Unpaid]
        );
        assert_eq!(AuthorizationPolicy::allowed_hour_types(Role::Approver).len(), 6);
        assert_eq!(AuthorizationPolicy::allowed_hour_types(Role::Admin).len(), 6);
    }

    #[test]
    fn test_approval_matrix() {
        for actor_role in Role::ALL {
            for target in Role::ALL {
                let expected = match actor_role {
                    Role::Admin => true,
                    Role::Approver => matches!(target, Role::Trainee | Role::Engineer),
                    _ => false,
                };
                assert_eq!(
                    AuthorizationPolicy::can_approve(actor_role, target),
                    expected,
                    "{actor_role} -> {target}"
                );
            }
        }
    }

    #[test]
    fn test_reviewable_roles() {
        assert_eq!(AuthorizationPolicy::reviewable_roles(Role::Admin), None);
        assert_eq!(
            AuthorizationPolicy::reviewable_roles(Role::Approver),
            Some(vec![Role::Trainee, Role::Engineer])
        );
        assert_eq!(AuthorizationPolicy::reviewable_roles(Role::Engineer), Some(vec![]));
    }

    #[test]
    fn test_non_owner_is_not_found() {
        let policy = AuthorizationPolicy;
        let result = policy.check(&actor(Role::Admin), Action::EditOwn { owner_id: 2 });
        assert_eq!(result, Err(PolicyDenial::NotOwner));
        let err = AppError::from(PolicyDenial::NotOwner);
        assert_eq!(err.code, ErrorCode::TimesheetNotFound);
    }

    #[test]
    fn test_review_denials() {
        let policy = AuthorizationPolicy;
        assert_eq!(
            policy.check(&actor(Role::Engineer), Action::Review { owner_role: Role::Trainee }),
            Err(PolicyDenial::ReviewerRequired)
        );
        assert_eq!(
            policy.check(&actor(Role::Approver), Action::Review { owner_role: Role::Internal }),
            Err(PolicyDenial::CannotReviewRole {
                actor: Role::Approver,
                owner: Role::Internal
            })
        );
        assert!(policy
            .check(&actor(Role::Approver), Action::Review { owner_role: Role::Engineer })
            .is_ok());
        assert!(policy
            .check(&actor(Role::Admin), Action::Review { owner_role: Role::Admin })
            .is_ok());
    }

    #[test]
    fn test_log_hours() {
        let policy = AuthorizationPolicy;
        let denial = policy
            .check(&actor(Role::Trainee), Action::LogHours { hour_type: HourType::Field })
            .unwrap_err();
        assert_eq!(AppError::from(denial).code, ErrorCode::HourTypeNotAllowed);
        assert!(policy
            .check(&actor(Role::Engineer), Action::LogHours { hour_type: HourType::Field })
            .is_ok());
    }

    #[test]
    fn test_add_note() {
        let policy = AuthorizationPolicy;
        let owner = ActingUser { id: 5, role: Role::Internal };
        let action = Action::AddNote { owner_id: 5, owner_role: Role::Internal };
        assert!(policy.check(&owner, action).is_ok());
        assert!(policy.check(&actor(Role::Admin), action).is_ok());
        assert_eq!(policy.check(&actor(Role::Approver), action), Err(PolicyDenial::NotOwner));
    }

    #[test]
    fn test_admin_only_actions() {
        let policy = AuthorizationPolicy;
        assert!(policy.check(&actor(Role::Admin), Action::ManagePayPeriods).is_ok());
        assert_eq!(
            policy.check(&actor(Role::Approver), Action::ManageUsers),
            Err(PolicyDenial::AdminRequired)
        );
    }
}

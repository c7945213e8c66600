//! 工时表服务
//!
//! 每个修改操作的检查顺序固定为:
//!
//! 1. 加载 (不存在 / 非本人 / 审核人看 NEW → 404)
//! 2. 发薪周期锁 (`PeriodLocked`)
//! 3. 授权策略 (工时类型、审批矩阵)
//! 4. 状态机
//!
//! 所有检查和写入在同一个事务中完成，任何一步失败都不会留下部分写入。
//! 通知在事务提交之后发出，失败只记录日志。

use std::sync::Arc;

use chrono::{Datelike, Weekday};
use shared::PaginatedResponse;
use shared::models::{
    Attachment, EntryInput, HourType, Note, ReimbursementItemInput, ReimbursementType,
    ReviewItem, ReviewQuery, Role, Timesheet, TimesheetCreate, TimesheetDetail, TimesheetStatus,
    TimesheetUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::lifecycle::{self, LifecycleEvent};
use super::{completeness, totals};
use crate::auth::{ActingUser, Action, AuthorizationPolicy};
use crate::core::Config;
use crate::db::repository::{
    RepoError, attachment, entry, note, reimbursement, timesheet, user,
};
use crate::db::repository::attachment::NewAttachment;
use crate::notify::NotificationDispatcher;
use crate::pay_periods::{Calendar, lock};
use crate::security_log;
use crate::storage::{AttachmentStore, calculate_hash, validate_upload};
use crate::utils::validation::{
    MAX_HOURS_PER_ENTRY, MAX_ITEM_NOTES_LEN, MAX_NOTE_LEN, MAX_REIMBURSEMENT_AMOUNT,
    MAX_USER_NOTES_LEN, validate_finite, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 审核列表每页上限
const MAX_PER_PAGE: u32 = 100;

/// 自动填充的每日工时
const AUTO_POPULATE_HOURS: f64 = 8.0;

/// 上传的附件
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub original_name: String,
    pub data: Vec<u8>,
    pub reimbursement_type: Option<ReimbursementType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

#[derive(Clone)]
pub struct TimesheetService {
    pool: SqlitePool,
    policy: AuthorizationPolicy,
    calendar: Calendar,
    notifier: Arc<dyn NotificationDispatcher>,
    store: AttachmentStore,
    max_upload_bytes: usize,
    review_page_size: u32,
}

impl std::fmt::Debug for TimesheetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimesheetService")
            .field("calendar", &self.calendar)
            .field("store", &self.store)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl TimesheetService {
    pub fn new(pool: SqlitePool, config: &Config, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            pool,
            policy: AuthorizationPolicy,
            calendar: Calendar::new(config.week_start_day, config.pay_period_start_day),
            notifier,
            store: AttachmentStore::new(&config.upload_dir),
            max_upload_bytes: config.max_upload_bytes,
            review_page_size: config.review_page_size.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    // ========== Owner side ==========

    /// 创建工时表 (week_start 归一到周起始日)
    pub async fn create(&self, actor: &ActingUser, data: &TimesheetCreate) -> AppResult<TimesheetDetail> {
        let week_start = self.calendar.week_start_of(data.week_start)?;

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        lock::ensure_unlocked(&mut *tx, week_start).await?;

        if timesheet::find_by_user_week(&mut *tx, actor.id, week_start)
            .await?
            .is_some()
        {
            return Err(timesheet_exists(week_start));
        }
        let ts = timesheet::insert(&mut *tx, actor.id, week_start)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => timesheet_exists(week_start),
                other => other.into(),
            })?;

        if data.auto_populate
            && let Some(hour_type) = auto_populate_type(actor.role)
        {
            let entries: Vec<EntryInput> = self
                .calendar
                .week_dates(week_start)?
                .into_iter()
                .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
                .map(|entry_date| EntryInput {
                    entry_date,
                    hour_type,
                    hours: AUTO_POPULATE_HOURS,
                })
                .collect();
            entry::replace(&mut tx, ts.id, &entries).await?;
        }

        let detail = self.detail(&mut tx, ts).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            timesheet_id = detail.timesheet.id,
            user_id = actor.id,
            week_start = %week_start,
            "Timesheet created"
        );
        Ok(detail)
    }

    /// 本人的工时表，最新周在前
    pub async fn list_own(
        &self,
        actor: &ActingUser,
        status: Option<TimesheetStatus>,
    ) -> AppResult<Vec<Timesheet>> {
        Ok(timesheet::find_by_user(&self.pool, actor.id, status).await?)
    }

    pub async fn get(&self, actor: &ActingUser, id: i64) -> AppResult<TimesheetDetail> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut conn, actor, id, Access::Read).await?;
        self.detail(&mut conn, ts).await
    }

    /// 修改本人可编辑字段; `reimbursement_items` 存在时整体替换
    pub async fn update(
        &self,
        actor: &ActingUser,
        id: i64,
        data: TimesheetUpdate,
    ) -> AppResult<TimesheetDetail> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;

        validate_optional_text(&data.user_notes, "user_notes", MAX_USER_NOTES_LEN)?;
        let items = data
            .reimbursement_items
            .as_deref()
            .map(normalize_items)
            .transpose()?;
        lifecycle::apply(ts.status, LifecycleEvent::Edit)?;

        let amount = match &items {
            Some(items) => {
                reimbursement::replace(&mut tx, id, items).await?;
                Some(totals::reimbursement_total(items))
            }
            None => None,
        };
        let updated = timesheet::update_owner_fields(&mut *tx, id, &data, amount).await?;

        let detail = self.detail(&mut tx, updated).await?;
        tx.commit().await.map_err(RepoError::from)?;
        Ok(detail)
    }

    /// 整体替换工时条目 (hours <= 0 的条目直接丢弃)
    pub async fn replace_entries(
        &self,
        actor: &ActingUser,
        id: i64,
        entries: Vec<EntryInput>,
    ) -> AppResult<TimesheetDetail> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;

        for e in &entries {
            validate_finite(e.hours, "hours")?;
            if e.hours > MAX_HOURS_PER_ENTRY {
                return Err(AppError::validation(format!(
                    "hours must not exceed {MAX_HOURS_PER_ENTRY} per entry"
                ))
                .with_detail("entry_date", e.entry_date.to_string()));
            }
        }
        let entries: Vec<EntryInput> = entries.into_iter().filter(|e| e.hours > 0.0).collect();

        let week_end = self.calendar.week_end(ts.week_start)?;
        for e in &entries {
            if e.entry_date < ts.week_start || e.entry_date > week_end {
                return Err(AppError::new(ErrorCode::EntryOutsideWeek)
                    .with_detail("entry_date", e.entry_date.to_string())
                    .with_detail("week_start", ts.week_start.to_string()));
            }
            self.policy
                .check(actor, Action::LogHours { hour_type: e.hour_type })?;
        }
        lifecycle::apply(ts.status, LifecycleEvent::Edit)?;

        entry::replace(&mut tx, id, &entries).await?;
        timesheet::touch(&mut *tx, id).await?;

        let ts = timesheet::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::timesheet_not_found(id))?;
        let detail = self.detail(&mut tx, ts).await?;
        tx.commit().await.map_err(RepoError::from)?;
        Ok(detail)
    }

    /// 提交: 完整性检查决定 SUBMITTED 或 NEEDS_APPROVAL，然后通知管理员
    pub async fn submit(&self, actor: &ActingUser, id: i64) -> AppResult<TimesheetDetail> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;

        let entries = entry::find_by_timesheet(&mut *tx, id).await?;
        let items = reimbursement::find_by_timesheet(&mut *tx, id).await?;
        let attachments = attachment::find_by_timesheet(&mut *tx, id).await?;
        let needs_review = completeness::needs_review(&entries, &items, &attachments);

        let to = lifecycle::target_status(ts.status, LifecycleEvent::Submit { needs_review })?;
        let updated = timesheet::mark_submitted(&mut *tx, id, ts.status, to).await?;

        let detail = self.detail(&mut tx, updated).await?;
        tx.commit().await.map_err(RepoError::from)?;

        log_transition(&ts, to, actor);
        self.notifier.notify_admin_new_submission(&detail.timesheet);
        Ok(detail)
    }

    /// 删除 (仅 NEW)，附件文件在提交后尽力删除
    pub async fn delete(&self, actor: &ActingUser, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;
        lifecycle::apply(ts.status, LifecycleEvent::Delete)?;

        let files = attachment::find_by_timesheet(&mut *tx, id).await?;
        entry::delete_by_timesheet(&mut *tx, id).await?;
        reimbursement::delete_by_timesheet(&mut *tx, id).await?;
        note::delete_by_timesheet(&mut *tx, id).await?;
        attachment::delete_by_timesheet(&mut *tx, id).await?;
        timesheet::delete(&mut *tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        for file in &files {
            self.store.remove(&file.filename).await;
        }
        tracing::info!(
            timesheet_id = id,
            actor_id = actor.id,
            attachments = files.len(),
            "Timesheet deleted"
        );
        Ok(())
    }

    /// 上传附件 (NEW / NEEDS_APPROVAL)，不改变状态
    pub async fn upload_attachment(
        &self,
        actor: &ActingUser,
        id: i64,
        upload: AttachmentUpload,
    ) -> AppResult<Attachment> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;

        let kind = validate_upload(&upload.original_name, &upload.data, self.max_upload_bytes)?;
        lifecycle::apply(ts.status, LifecycleEvent::UploadAttachment)?;

        let filename = self.store.save(&upload.data, &kind.extension).await?;
        let row = NewAttachment {
            timesheet_id: id,
            filename: filename.clone(),
            original_name: upload.original_name,
            mime_type: kind.mime_type,
            file_size: upload.data.len() as i64,
            sha256: calculate_hash(&upload.data),
            reimbursement_type: upload.reimbursement_type,
            uploaded_by: actor.id,
        };

        match persist_attachment(tx, &row).await {
            Ok(saved) => {
                tracing::info!(
                    timesheet_id = id,
                    attachment_id = saved.id,
                    size = saved.file_size,
                    "Attachment uploaded"
                );
                Ok(saved)
            }
            Err(e) => {
                self.store.remove(&filename).await;
                Err(e)
            }
        }
    }

    /// 删除附件 (仅 NEW)
    pub async fn delete_attachment(
        &self,
        actor: &ActingUser,
        id: i64,
        attachment_id: i64,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_owner(&mut tx, actor, id, Access::Write).await?;
        lifecycle::apply(ts.status, LifecycleEvent::DeleteAttachment)?;

        let found = attachment::find_by_id(&mut *tx, attachment_id)
            .await?
            .filter(|a| a.timesheet_id == id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::AttachmentNotFound)
                    .with_detail("attachment_id", attachment_id)
            })?;
        attachment::delete(&mut *tx, attachment_id).await?;
        timesheet::touch(&mut *tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        self.store.remove(&found.filename).await;
        Ok(())
    }

    /// 追加历史备注: 本人或有审批权的审核人; 周期锁定后拒绝
    pub async fn add_note(&self, actor: &ActingUser, id: i64, content: &str) -> AppResult<Note> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        let ts = timesheet::find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::timesheet_not_found(id))?;

        let owner_role = if ts.user_id == actor.id {
            actor.role
        } else if ts.status == TimesheetStatus::New {
            return Err(AppError::timesheet_not_found(id));
        } else {
            owner_role(&mut conn, ts.user_id).await?
        };
        lock::ensure_unlocked(&mut *conn, ts.week_start).await?;
        self.policy.check(
            actor,
            Action::AddNote {
                owner_id: ts.user_id,
                owner_role,
            },
        )?;
        validate_required_text(content, "content", MAX_NOTE_LEN)?;

        Ok(note::insert(&mut *conn, id, actor.id, content.trim()).await?)
    }

    // ========== Review side ==========

    /// 审核队列 (不含 NEW)，审批人只能看到可审批角色的工时表
    pub async fn list_for_review(
        &self,
        actor: &ActingUser,
        query: &ReviewQuery,
    ) -> AppResult<PaginatedResponse<ReviewItem>> {
        self.policy.check(actor, Action::ListReview)?;

        let roles = AuthorizationPolicy::reviewable_roles(actor.role);
        let filter = timesheet::ReviewFilter {
            status: query.status,
            user_id: query.user_id,
            week_start: query.week_start,
            owner_roles: roles.as_deref(),
        };
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(self.review_page_size)
            .clamp(1, MAX_PER_PAGE);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        let total = timesheet::count_for_review(&mut *conn, &filter).await?;
        let items =
            timesheet::find_for_review(&mut *conn, &filter, i64::from(per_page), offset).await?;

        Ok(PaginatedResponse::new(
            items,
            page,
            per_page,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    pub async fn get_for_review(&self, actor: &ActingUser, id: i64) -> AppResult<TimesheetDetail> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        let ts = self.load_for_review(&mut conn, actor, id, Access::Read).await?;
        self.detail(&mut conn, ts).await
    }

    pub async fn approve(&self, actor: &ActingUser, id: i64) -> AppResult<Timesheet> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_review(&mut tx, actor, id, Access::Write).await?;
        let to = lifecycle::target_status(ts.status, LifecycleEvent::Approve)?;

        let updated = timesheet::mark_approved(&mut *tx, id, ts.status, actor.id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        log_transition(&ts, to, actor);
        self.notifier.notify_approved(&updated);
        Ok(updated)
    }

    /// 退回: 原因写入 admin_notes 并追加历史备注
    pub async fn reject(&self, actor: &ActingUser, id: i64, reason: &str) -> AppResult<Timesheet> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_review(&mut tx, actor, id, Access::Write).await?;

        validate_required_text(reason, "reason", MAX_NOTE_LEN)?;
        let reason = reason.trim();
        let to = lifecycle::target_status(ts.status, LifecycleEvent::Reject)?;

        let updated = timesheet::mark_rejected(&mut *tx, id, reason).await?;
        note::insert(&mut *tx, id, actor.id, &format!("Needs approval: {reason}")).await?;
        tx.commit().await.map_err(RepoError::from)?;

        log_transition(&ts, to, actor);
        self.notifier.notify_needs_attention(&updated, reason);
        Ok(updated)
    }

    /// 撤销批准: APPROVED → SUBMITTED
    pub async fn unapprove(&self, actor: &ActingUser, id: i64) -> AppResult<Timesheet> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_review(&mut tx, actor, id, Access::Write).await?;
        let to = lifecycle::target_status(ts.status, LifecycleEvent::Unapprove)?;

        let updated = timesheet::mark_unapproved(&mut *tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        log_transition(&ts, to, actor);
        Ok(updated)
    }

    /// 管理员备注 (空白视为清除)
    pub async fn set_admin_notes(
        &self,
        actor: &ActingUser,
        id: i64,
        admin_notes: Option<String>,
    ) -> AppResult<Timesheet> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let ts = self.load_for_review(&mut tx, actor, id, Access::Write).await?;

        validate_optional_text(&admin_notes, "admin_notes", MAX_NOTE_LEN)?;
        let admin_notes = admin_notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        lifecycle::apply(ts.status, LifecycleEvent::ReviewerEdit)?;

        let updated = timesheet::set_admin_notes(&mut *tx, id, admin_notes).await?;
        tx.commit().await.map_err(RepoError::from)?;
        Ok(updated)
    }

    // ========== Helpers ==========

    /// 加载本人的工时表; 写操作额外检查周期锁
    async fn load_for_owner(
        &self,
        conn: &mut SqliteConnection,
        actor: &ActingUser,
        id: i64,
        access: Access,
    ) -> AppResult<Timesheet> {
        let ts = timesheet::find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::timesheet_not_found(id))?;

        let action = match access {
            Access::Read => Action::ViewOwn { owner_id: ts.user_id },
            Access::Write => Action::EditOwn { owner_id: ts.user_id },
        };
        self.policy
            .check(actor, action)
            .map_err(|_| AppError::timesheet_not_found(id))?;

        if access == Access::Write {
            lock::ensure_unlocked(&mut *conn, ts.week_start).await?;
        }
        Ok(ts)
    }

    /// 加载待审核的工时表 (NEW 对审核人不可见)
    async fn load_for_review(
        &self,
        conn: &mut SqliteConnection,
        actor: &ActingUser,
        id: i64,
        access: Access,
    ) -> AppResult<Timesheet> {
        let ts = timesheet::find_by_id(&mut *conn, id)
            .await?
            .filter(|ts| ts.status != TimesheetStatus::New)
            .ok_or_else(|| AppError::timesheet_not_found(id))?;

        if access == Access::Write {
            lock::ensure_unlocked(&mut *conn, ts.week_start).await?;
        }

        let owner_role = owner_role(conn, ts.user_id).await?;
        self.policy.check(actor, Action::Review { owner_role })?;
        Ok(ts)
    }

    async fn detail(&self, conn: &mut SqliteConnection, ts: Timesheet) -> AppResult<TimesheetDetail> {
        let entries = entry::find_by_timesheet(&mut *conn, ts.id).await?;
        let attachments = attachment::find_by_timesheet(&mut *conn, ts.id).await?;
        let reimbursement_items = reimbursement::find_by_timesheet(&mut *conn, ts.id).await?;
        let notes = note::find_by_timesheet(&mut *conn, ts.id).await?;

        Ok(TimesheetDetail {
            totals: totals::hour_totals(&entries),
            needs_review: completeness::needs_review(&entries, &reimbursement_items, &attachments),
            timesheet: ts,
            entries,
            attachments,
            reimbursement_items,
            notes,
        })
    }
}

/// 工时表所有者的角色 (严格解析，未知角色拒绝)
async fn owner_role(conn: &mut SqliteConnection, owner_id: i64) -> AppResult<Role> {
    let owner = user::find_by_id(&mut *conn, owner_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", owner_id))?;

    owner.role().map_err(|e| {
        security_log!(
            "WARN",
            "unknown_owner_role",
            user_id = owner_id,
            role = e.0.as_str()
        );
        AppError::with_message(ErrorCode::UnknownRole, e.to_string())
            .with_detail("user_id", owner_id)
    })
}

async fn persist_attachment(
    mut tx: sqlx::Transaction<'_, sqlx::Sqlite>,
    row: &NewAttachment,
) -> AppResult<Attachment> {
    let saved = attachment::insert(&mut *tx, row).await?;
    timesheet::touch(&mut *tx, row.timesheet_id).await?;
    tx.commit().await.map_err(RepoError::from)?;
    Ok(saved)
}

/// 报销项校验: 金额必须是有限数并截断到 [0, MAX]
fn normalize_items(items: &[ReimbursementItemInput]) -> AppResult<Vec<ReimbursementItemInput>> {
    items
        .iter()
        .map(|item| {
            validate_finite(item.amount, "amount")?;
            validate_optional_text(&item.notes, "notes", MAX_ITEM_NOTES_LEN)?;
            Ok(ReimbursementItemInput {
                amount: item.amount.clamp(0.0, MAX_REIMBURSEMENT_AMOUNT),
                notes: item
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
                ..item.clone()
            })
        })
        .collect()
}

/// 可填 Field 时用 Field，否则用角色的第一个可填类型
fn auto_populate_type(role: Role) -> Option<HourType> {
    let allowed = AuthorizationPolicy::allowed_hour_types(role);
    if allowed.contains(&HourType::Field) {
        Some(HourType::Field)
    } else {
        allowed.first().copied()
    }
}

fn timesheet_exists(week_start: chrono::NaiveDate) -> AppError {
    AppError::new(ErrorCode::TimesheetExists).with_detail("week_start", week_start.to_string())
}

fn log_transition(ts: &Timesheet, to: TimesheetStatus, actor: &ActingUser) {
    tracing::info!(
        timesheet_id = ts.id,
        from = %ts.status,
        to = %to,
        actor_id = actor.id,
        "Timesheet status changed"
    );
}

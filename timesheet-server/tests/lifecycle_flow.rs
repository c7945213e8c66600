//! 工时表完整生命周期: 提交、完整性检查、审核、退回、发薪周期锁

mod common;

use common::{PDF_BYTES, Sent, TestApp, date};
use shared::models::{
    EntryInput, HourType, ReviewQuery, Role, TimesheetCreate, TimesheetStatus, TimesheetUpdate,
};
use timesheet_server::ErrorCode;
use chrono::Datelike;
use timesheet_server::timesheets::{AttachmentUpload, TimesheetService};

fn week(day: chrono::NaiveDate) -> TimesheetCreate {
    TimesheetCreate {
        week_start: day,
        auto_populate: false,
    }
}

fn hours(entry_date: chrono::NaiveDate, hour_type: HourType, hours: f64) -> EntryInput {
    EntryInput {
        entry_date,
        hour_type,
        hours,
    }
}

fn pdf() -> AttachmentUpload {
    AttachmentUpload {
        original_name: "proof.pdf".into(),
        data: PDF_BYTES.to_vec(),
        reimbursement_type: None,
    }
}

#[tokio::test]
async fn test_field_hours_without_proof_need_approval_until_resubmitted() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let ts = sheets.create(&engineer, &week(date(2024, 3, 17))).await.unwrap();
    let id = ts.timesheet.id;
    sheets
        .replace_entries(&engineer, id, vec![hours(date(2024, 3, 18), HourType::Field, 8.0)])
        .await
        .unwrap();

    let submitted = sheets.submit(&engineer, id).await.unwrap();
    assert_eq!(submitted.timesheet.status, TimesheetStatus::NeedsApproval);
    assert!(submitted.timesheet.submitted_at.is_some());

    // 上传附件不会改变状态
    sheets.upload_attachment(&engineer, id, pdf()).await.unwrap();
    let detail = sheets.get(&engineer, id).await.unwrap();
    assert_eq!(detail.timesheet.status, TimesheetStatus::NeedsApproval);
    assert_eq!(detail.attachments.len(), 1);
    assert!(!detail.needs_review);

    let resubmitted = sheets.submit(&engineer, id).await.unwrap();
    assert_eq!(resubmitted.timesheet.status, TimesheetStatus::Submitted);

    assert_eq!(
        app.dispatcher.sent(),
        vec![
            Sent::NewSubmission { timesheet_id: id },
            Sent::NewSubmission { timesheet_id: id },
        ]
    );
}

#[tokio::test]
async fn test_receipt_must_match_reimbursement_type() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    let update = TimesheetUpdate {
        has_expenses: Some(true),
        reimbursement_items: Some(vec![shared::models::ReimbursementItemInput {
            reimbursement_type: shared::models::ReimbursementType::Food,
            amount: 42.5,
            expense_date: Some(date(2024, 3, 19)),
            notes: None,
        }]),
        ..Default::default()
    };
    let detail = sheets.update(&engineer, id, update).await.unwrap();
    assert_eq!(detail.timesheet.reimbursement_amount, 42.5);
    assert!(detail.needs_review);

    // 未标记类型的附件不算收据
    sheets.upload_attachment(&engineer, id, pdf()).await.unwrap();
    assert!(sheets.get(&engineer, id).await.unwrap().needs_review);

    let receipt = AttachmentUpload {
        reimbursement_type: Some(shared::models::ReimbursementType::Food),
        ..pdf()
    };
    sheets.upload_attachment(&engineer, id, receipt).await.unwrap();
    let submitted = sheets.submit(&engineer, id).await.unwrap();
    assert_eq!(submitted.timesheet.status, TimesheetStatus::Submitted);
}

#[tokio::test]
async fn test_create_normalizes_week_and_auto_populates() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;

    let detail = app
        .state
        .timesheets
        .create(
            &engineer,
            &TimesheetCreate {
                week_start: date(2024, 3, 20),
                auto_populate: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.timesheet.week_start, date(2024, 3, 17));
    assert_eq!(detail.timesheet.status, TimesheetStatus::New);
    assert_eq!(detail.entries.len(), 5);
    assert!(detail.entries.iter().all(|e| e.hour_type == HourType::Field));
    assert_eq!(detail.entries[0].entry_date, date(2024, 3, 18));
    assert_eq!(detail.totals.total, 40.0);
}

#[tokio::test]
async fn test_week_past_calendar_end_is_rejected() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;

    // 以最大日期为周起始日，整周超出可表示范围
    let mut config = app.state.config.clone();
    config.week_start_day = chrono::NaiveDate::MAX.weekday();
    let sheets = TimesheetService::new(app.state.pool.clone(), &config, app.dispatcher.clone());

    let err = sheets
        .create(
            &engineer,
            &TimesheetCreate {
                week_start: chrono::NaiveDate::MAX,
                auto_populate: true,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
    assert!(sheets.list_own(&engineer, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_week_is_rejected() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    sheets.create(&engineer, &week(date(2024, 3, 17))).await.unwrap();
    let err = sheets
        .create(&engineer, &week(date(2024, 3, 22)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TimesheetExists);

    // 其他人同一周不受影响
    let (_, other) = app.user("other@example.com", Role::Engineer).await;
    assert!(sheets.create(&other, &week(date(2024, 3, 17))).await.is_ok());
}

#[tokio::test]
async fn test_totals_split_payable_and_billable() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&admin, &week(date(2024, 3, 10)))
        .await
        .unwrap()
        .timesheet
        .id;
    let detail = sheets
        .replace_entries(
            &admin,
            id,
            vec![
                hours(date(2024, 3, 11), HourType::Field, 8.0),
                hours(date(2024, 3, 12), HourType::Internal, 8.0),
                hours(date(2024, 3, 13), HourType::Training, 0.0),
            ],
        )
        .await
        .unwrap();

    assert_eq!(detail.entries.len(), 2);
    assert_eq!(detail.totals.payable, 16.0);
    assert_eq!(detail.totals.billable, 8.0);
    assert_eq!(detail.totals.total, 16.0);
    assert_eq!(detail.totals.unpaid, 0.0);
}

#[tokio::test]
async fn test_entries_are_checked_against_role_and_week() {
    let app = TestApp::new().await;
    let (_, trainee) = app.user("trainee@example.com", Role::Trainee).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&trainee, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;

    let err = sheets
        .replace_entries(
            &trainee,
            id,
            vec![
                hours(date(2024, 3, 18), HourType::Training, 4.0),
                hours(date(2024, 3, 19), HourType::Field, 8.0),
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::HourTypeNotAllowed);
    assert!(sheets.get(&trainee, id).await.unwrap().entries.is_empty());

    let err = sheets
        .replace_entries(&trainee, id, vec![hours(date(2024, 3, 25), HourType::Training, 4.0)])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EntryOutsideWeek);
}

#[tokio::test]
async fn test_other_users_timesheet_is_not_found() {
    let app = TestApp::new().await;
    let (_, owner) = app.user("owner@example.com", Role::Engineer).await;
    let (_, other) = app.user("other@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&owner, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;

    assert_eq!(sheets.get(&other, id).await.unwrap_err().code, ErrorCode::TimesheetNotFound);
    assert_eq!(sheets.delete(&other, id).await.unwrap_err().code, ErrorCode::TimesheetNotFound);
    // NEW 工时表对审核人也不可见
    assert_eq!(
        sheets.get_for_review(&other, id).await.unwrap_err().code,
        ErrorCode::TimesheetNotFound
    );
}

#[tokio::test]
async fn test_approver_cannot_review_internal_staff() {
    let app = TestApp::new().await;
    let (_, internal) = app.user("staff@example.com", Role::Internal).await;
    let (_, approver) = app.user("approver@example.com", Role::Approver).await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&internal, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets
        .replace_entries(&internal, id, vec![hours(date(2024, 3, 18), HourType::Internal, 8.0)])
        .await
        .unwrap();
    let submitted = sheets.submit(&internal, id).await.unwrap();
    assert_eq!(submitted.timesheet.status, TimesheetStatus::Submitted);

    let err = sheets.approve(&approver, id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CannotReviewRole);

    let queue = sheets
        .list_for_review(&approver, &ReviewQuery::default())
        .await
        .unwrap();
    assert!(queue.items.is_empty());

    let queue = sheets
        .list_for_review(&admin, &ReviewQuery::default())
        .await
        .unwrap();
    assert_eq!(queue.items.len(), 1);
    assert_eq!(queue.items[0].owner_role, "internal");

    let approved = sheets.approve(&admin, id).await.unwrap();
    assert_eq!(approved.status, TimesheetStatus::Approved);
    assert_eq!(approved.approved_by, Some(admin.id));
    assert!(app.dispatcher.sent().contains(&Sent::Approved { timesheet_id: id }));
}

#[tokio::test]
async fn test_owner_cannot_review() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.submit(&engineer, id).await.unwrap();

    let err = sheets.approve(&engineer, id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReviewerRequired);
    let err = sheets
        .list_for_review(&engineer, &ReviewQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReviewerRequired);
}

#[tokio::test]
async fn test_reject_records_reason_and_allows_resubmit() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let (_, approver) = app.user("approver@example.com", Role::Approver).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets
        .replace_entries(&engineer, id, vec![hours(date(2024, 3, 18), HourType::Field, 8.0)])
        .await
        .unwrap();
    sheets.upload_attachment(&engineer, id, pdf()).await.unwrap();
    sheets.submit(&engineer, id).await.unwrap();

    let rejected = sheets.reject(&approver, id, "  wrong customer  ").await.unwrap();
    assert_eq!(rejected.status, TimesheetStatus::NeedsApproval);
    assert_eq!(rejected.admin_notes.as_deref(), Some("wrong customer"));

    let detail = sheets.get(&engineer, id).await.unwrap();
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].content, "Needs approval: wrong customer");
    assert!(app.dispatcher.sent().contains(&Sent::NeedsAttention {
        timesheet_id: id,
        reason: "wrong customer".into(),
    }));

    // NEEDS_APPROVAL 不能再次退回
    let err = sheets.reject(&approver, id, "again").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatus);

    let resubmitted = sheets.submit(&engineer, id).await.unwrap();
    assert_eq!(resubmitted.timesheet.status, TimesheetStatus::Submitted);

    let approved = sheets.approve(&approver, id).await.unwrap();
    assert_eq!(approved.status, TimesheetStatus::Approved);
    let reopened = sheets.unapprove(&approver, id).await.unwrap();
    assert_eq!(reopened.status, TimesheetStatus::Submitted);
    assert_eq!(reopened.approved_at, None);
}

#[tokio::test]
async fn test_submitted_timesheet_is_read_only_for_owner() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.submit(&engineer, id).await.unwrap();

    let err = sheets
        .update(&engineer, id, TimesheetUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatus);
    assert_eq!(err.details.unwrap()["status"], "SUBMITTED");
    assert_eq!(sheets.delete(&engineer, id).await.unwrap_err().code, ErrorCode::InvalidStatus);
    assert_eq!(
        sheets.upload_attachment(&engineer, id, pdf()).await.unwrap_err().code,
        ErrorCode::InvalidStatus
    );
    assert_eq!(
        sheets.submit(&engineer, id).await.unwrap_err().code,
        ErrorCode::InvalidStatus
    );
}

#[tokio::test]
async fn test_delete_removes_rows_and_files() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.upload_attachment(&engineer, id, pdf()).await.unwrap();
    assert_eq!(app.upload_dir_entries(), 1);

    sheets.delete(&engineer, id).await.unwrap();
    assert_eq!(app.upload_dir_entries(), 0);
    assert_eq!(sheets.get(&engineer, id).await.unwrap_err().code, ErrorCode::TimesheetNotFound);

    // 同一周可以重新创建
    assert!(sheets.create(&engineer, &week(date(2024, 3, 17))).await.is_ok());
}

#[tokio::test]
async fn test_rejected_upload_leaves_no_file() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;

    let disguised = AttachmentUpload {
        original_name: "receipt.pdf".into(),
        data: b"MZ\x90\x00not a pdf".to_vec(),
        reimbursement_type: None,
    };
    let err = sheets.upload_attachment(&engineer, id, disguised).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::FileContentMismatch);

    let exe = AttachmentUpload {
        original_name: "setup.exe".into(),
        data: b"MZ\x90\x00".to_vec(),
        reimbursement_type: None,
    };
    let err = sheets.upload_attachment(&engineer, id, exe).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    assert_eq!(app.upload_dir_entries(), 0);
}

#[tokio::test]
async fn test_confirmed_pay_period_locks_every_mutation() {
    let app = TestApp::new().await;
    let (_, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let (_, late) = app.user("late@example.com", Role::Engineer).await;
    let (_, approver) = app.user("approver@example.com", Role::Approver).await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;
    let periods = &app.state.pay_periods;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.submit(&engineer, id).await.unwrap();
    sheets.approve(&approver, id).await.unwrap();

    let period = periods
        .confirm(&admin, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap();
    assert_eq!(period.confirmed_by, admin.id);
    assert!(periods.is_locked(date(2024, 3, 17)).await.unwrap());
    assert!(!periods.is_locked(date(2024, 3, 31)).await.unwrap());

    let locked = |code: ErrorCode| assert_eq!(code, ErrorCode::PeriodLocked);
    locked(sheets.unapprove(&approver, id).await.unwrap_err().code);
    locked(sheets.set_admin_notes(&admin, id, Some("late".into())).await.unwrap_err().code);
    locked(
        sheets
            .update(&engineer, id, TimesheetUpdate::default())
            .await
            .unwrap_err()
            .code,
    );
    locked(sheets.delete(&engineer, id).await.unwrap_err().code);
    locked(sheets.upload_attachment(&engineer, id, pdf()).await.unwrap_err().code);
    locked(sheets.create(&late, &week(date(2024, 3, 17))).await.unwrap_err().code);
    locked(sheets.submit(&engineer, id).await.unwrap_err().code);
    locked(sheets.approve(&approver, id).await.unwrap_err().code);
    locked(sheets.reject(&admin, id, "wrong week").await.unwrap_err().code);
    locked(
        sheets
            .replace_entries(&engineer, id, vec![hours(date(2024, 3, 18), HourType::Field, 8.0)])
            .await
            .unwrap_err()
            .code,
    );
    locked(sheets.delete_attachment(&engineer, id, 1).await.unwrap_err().code);
    locked(sheets.add_note(&engineer, id, "paid, thanks").await.unwrap_err().code);
    locked(sheets.add_note(&admin, id, "checked").await.unwrap_err().code);

    // 锁优先于输入校验
    locked(sheets.reject(&admin, id, "   ").await.unwrap_err().code);
    locked(sheets.add_note(&engineer, id, "").await.unwrap_err().code);
    locked(
        sheets
            .set_admin_notes(&admin, id, Some("x".repeat(10_000)))
            .await
            .unwrap_err()
            .code,
    );
    let too_long = TimesheetUpdate {
        user_notes: Some("x".repeat(10_000)),
        ..Default::default()
    };
    locked(sheets.update(&engineer, id, too_long).await.unwrap_err().code);
    locked(
        sheets
            .replace_entries(&engineer, id, vec![hours(date(2024, 3, 18), HourType::Field, f64::NAN)])
            .await
            .unwrap_err()
            .code,
    );
    let not_a_pdf = AttachmentUpload {
        original_name: "notes.exe".into(),
        data: b"MZ".to_vec(),
        reimbursement_type: None,
    };
    locked(sheets.upload_attachment(&engineer, id, not_a_pdf).await.unwrap_err().code);

    let err = sheets.unapprove(&approver, id).await.unwrap_err();
    let details = err.details.unwrap();
    assert_eq!(details["pay_period_start"], "2024-03-11");
    assert_eq!(details["pay_period_end"], "2024-03-24");

    // 只读操作不受锁影响
    let detail = sheets.get(&engineer, id).await.unwrap();
    assert_eq!(detail.timesheet.status, TimesheetStatus::Approved);
    assert!(detail.notes.is_empty());
    assert!(sheets.get_for_review(&admin, id).await.is_ok());
}

#[tokio::test]
async fn test_confirm_refuses_pending_timesheets() {
    let app = TestApp::new().await;
    let (_, a) = app.user("a@example.com", Role::Engineer).await;
    let (_, b) = app.user("b@example.com", Role::Engineer).await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;
    let periods = &app.state.pay_periods;

    sheets.create(&a, &week(date(2024, 3, 17))).await.unwrap();
    let id = sheets
        .create(&b, &week(date(2024, 3, 24)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.submit(&b, id).await.unwrap();

    let err = periods
        .confirm(&admin, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PayPeriodHasPending);
    let details = err.details.unwrap();
    assert_eq!(details["pending_total"], 2);
    assert_eq!(details["pending"]["NEW"], 1);
    assert_eq!(details["pending"]["SUBMITTED"], 1);

    assert!(periods.list(&admin).await.unwrap().is_empty());
    assert!(!periods.is_locked(date(2024, 3, 17)).await.unwrap());
}

#[tokio::test]
async fn test_confirm_validates_range() {
    let app = TestApp::new().await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let (_, approver) = app.user("approver@example.com", Role::Approver).await;
    let periods = &app.state.pay_periods;

    let err = periods
        .confirm(&approver, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AdminRequired);

    let err = periods
        .confirm(&admin, date(2024, 3, 12), date(2024, 3, 25))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PayPeriodInvalidStart);

    let err = periods
        .confirm(&admin, date(2024, 3, 11), date(2024, 3, 23))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PayPeriodInvalidLength);

    periods
        .confirm(&admin, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap();
    let err = periods
        .confirm(&admin, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PayPeriodAlreadyConfirmed);
    let err = periods
        .confirm(&admin, date(2024, 3, 18), date(2024, 3, 31))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PayPeriodOverlap);

    let status = periods
        .status(&admin, date(2024, 3, 11), date(2024, 3, 24))
        .await
        .unwrap();
    assert!(status.confirmed);
}

#[tokio::test]
async fn test_unknown_owner_role_fails_closed() {
    let app = TestApp::new().await;
    let (owner, engineer) = app.user("eng@example.com", Role::Engineer).await;
    let (_, admin) = app.user("admin@example.com", Role::Admin).await;
    let sheets = &app.state.timesheets;

    let id = sheets
        .create(&engineer, &week(date(2024, 3, 17)))
        .await
        .unwrap()
        .timesheet
        .id;
    sheets.submit(&engineer, id).await.unwrap();

    app.set_raw_role(owner.id, "contractor").await;
    let err = sheets.approve(&admin, id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownRole);

    // 旧角色名按别名解析
    app.set_raw_role(owner.id, "staff").await;
    let approved = sheets.approve(&admin, id).await.unwrap();
    assert_eq!(approved.status, TimesheetStatus::Approved);
}

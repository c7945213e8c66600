//! 工时与报销汇总
//!
//! 内部使用 `Decimal` 计算，输出时转回 `f64` 并保留 2 位小数。

use rust_decimal::prelude::*;
use shared::models::{ReimbursementItemInput, TimesheetEntry, TimesheetTotals};

const DECIMAL_PLACES: u32 = 2;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// 按工时类型属性汇总
pub fn hour_totals(entries: &[TimesheetEntry]) -> TimesheetTotals {
    let mut payable = Decimal::ZERO;
    let mut billable = Decimal::ZERO;
    let mut unpaid = Decimal::ZERO;
    let mut total = Decimal::ZERO;

    for entry in entries {
        let hours = to_decimal(entry.hours);
        total += hours;
        if entry.hour_type.is_payable() {
            payable += hours;
        } else {
            unpaid += hours;
        }
        if entry.hour_type.is_billable() {
            billable += hours;
        }
    }

    TimesheetTotals {
        payable: to_f64(payable),
        billable: to_f64(billable),
        unpaid: to_f64(unpaid),
        total: to_f64(total),
    }
}

/// 报销总额
pub fn reimbursement_total(items: &[ReimbursementItemInput]) -> f64 {
    to_f64(items.iter().map(|i| to_decimal(i.amount)).sum())
}

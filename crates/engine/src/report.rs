//! Read-only settlement report, resolved to member names and contacts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{Group, Member, MemberId, compute_settlement};

const UNKNOWN_MEMBER: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub group_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub member_count: usize,
    pub expense_count: usize,
    pub total_expenses: i64,
    pub total_settlements: i64,
    /// `round(total_expenses / member_count)`, 0 without members.
    pub average_per_member: i64,
    pub members: Vec<MemberLine>,
    pub expenses: Vec<ExpenseLine>,
    pub settlements: Vec<SettlementLine>,
}

/// Roster entry, so members who paid nothing still show their contacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberLine {
    pub name: String,
    pub phone: String,
    pub account: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseLine {
    pub date: NaiveDate,
    pub title: String,
    pub amount: i64,
    pub payer: String,
    pub participants: Vec<String>,
    pub per_person_amount: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementLine {
    pub from: String,
    pub to: String,
    pub amount: i64,
    /// Phone of the member who pays.
    pub from_phone: String,
    /// Bank account of the member who receives.
    pub to_account: String,
}

impl SettlementReport {
    pub fn build(group: &Group) -> Self {
        let settlements = compute_settlement(&group.expenses);
        let total_expenses = group.total_expenses();
        let member_count = group.members.len();

        let members = group
            .members
            .iter()
            .map(|member| MemberLine {
                name: member.name.clone(),
                phone: member.phone.clone(),
                account: member.account.clone(),
                joined_at: member.joined_at,
            })
            .collect();

        let expenses = group
            .expenses
            .iter()
            .map(|expense| ExpenseLine {
                date: expense.date,
                title: expense.title.clone(),
                amount: expense.amount,
                payer: name_of(group, expense.payer_id),
                participants: expense
                    .participants
                    .iter()
                    .filter_map(|id| member_of(group, *id).map(|m| m.name.clone()))
                    .collect(),
                per_person_amount: expense.per_person_amount,
            })
            .collect();

        let lines: Vec<SettlementLine> = settlements
            .iter()
            .map(|s| SettlementLine {
                from: name_of(group, s.from),
                to: name_of(group, s.to),
                amount: s.amount,
                from_phone: member_of(group, s.from)
                    .map(|m| m.phone.clone())
                    .unwrap_or_default(),
                to_account: member_of(group, s.to)
                    .map(|m| m.account.clone())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            group_name: group.name.clone(),
            description: group.description.clone(),
            created_at: group.created_at,
            member_count,
            expense_count: group.expenses.len(),
            total_expenses,
            total_settlements: settlements
                .iter()
                .fold(0i64, |total, s| total.saturating_add(s.amount)),
            average_per_member: average(total_expenses, member_count),
            members,
            expenses,
            settlements: lines,
        }
    }
}

fn member_of(group: &Group, id: MemberId) -> Option<&Member> {
    group.members.get(id)
}

fn name_of(group: &Group, id: MemberId) -> String {
    member_of(group, id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| UNKNOWN_MEMBER.to_string())
}

fn average(total: i64, members: usize) -> i64 {
    match i64::try_from(members) {
        Ok(0) | Err(_) => 0,
        Ok(count) => total.saturating_mul(2).saturating_add(count) / count.saturating_mul(2),
    }
}

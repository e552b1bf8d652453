//! Shared expenses.
//!
//! An expense is always split equally among its participants. Amounts are
//! integers in the smallest currency unit (e.g. won), so the per-person share
//! is rounded to the nearest integer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MemberId, ResultEngine};

/// Largest accepted amount, for a single expense and for the sum of all
/// expenses of a group. Keeps every settlement and report total within `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Dense expense id (position in the expense list).
pub type ExpenseId = usize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: i64,
    pub payer_id: MemberId,
    pub participants: Vec<MemberId>,
    pub per_person_amount: i64,
    pub date: NaiveDate,
}

/// Fields supplied by the caller when an expense is recorded or edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: i64,
    pub payer_id: MemberId,
    pub participants: Vec<MemberId>,
    pub date: NaiveDate,
}

impl Expense {
    /// Build a validated expense for a group with `member_count` members.
    pub fn new(id: ExpenseId, new: NewExpense, member_count: usize) -> ResultEngine<Self> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(EngineError::MalformedExpense(
                "title must not be empty".to_string(),
            ));
        }
        let expense = Self {
            id,
            title: title.to_string(),
            amount: new.amount,
            payer_id: new.payer_id,
            per_person_amount: per_person_amount(new.amount, new.participants.len())?,
            participants: new.participants,
            date: new.date,
        };
        expense.validate(member_count)?;
        Ok(expense)
    }

    /// Recompute `per_person_amount` after `amount` or `participants` changed.
    pub(crate) fn recompute_share(&mut self) -> ResultEngine<()> {
        self.per_person_amount = per_person_amount(self.amount, self.participants.len())?;
        Ok(())
    }

    /// Check the expense is well formed and only references members in
    /// `0..member_count`.
    pub fn validate(&self, member_count: usize) -> ResultEngine<()> {
        if self.amount <= 0 {
            return Err(EngineError::MalformedExpense(format!(
                "expense {}: amount must be > 0",
                self.id
            )));
        }
        if self.participants.is_empty() {
            return Err(EngineError::MalformedExpense(format!(
                "expense {}: participants must not be empty",
                self.id
            )));
        }
        if self.payer_id >= member_count {
            return Err(EngineError::MalformedExpense(format!(
                "expense {}: payer {} is not a member",
                self.id, self.payer_id
            )));
        }
        for (pos, participant) in self.participants.iter().enumerate() {
            if *participant >= member_count {
                return Err(EngineError::MalformedExpense(format!(
                    "expense {}: participant {participant} is not a member",
                    self.id
                )));
            }
            if self.participants[..pos].contains(participant) {
                return Err(EngineError::MalformedExpense(format!(
                    "expense {}: participant {participant} listed twice",
                    self.id
                )));
            }
        }
        let expected = per_person_amount(self.amount, self.participants.len())?;
        if self.per_person_amount != expected {
            return Err(EngineError::MalformedExpense(format!(
                "expense {}: per person amount {} does not match {expected}",
                self.id, self.per_person_amount
            )));
        }
        Ok(())
    }
}

/// Equal share of `amount` over `participants`, rounded to the nearest
/// integer (halves away from zero).
///
/// # Examples
///
/// ```rust
/// use engine::per_person_amount;
///
/// assert_eq!(per_person_amount(300, 3).unwrap(), 100);
/// assert_eq!(per_person_amount(100, 3).unwrap(), 33);
/// assert_eq!(per_person_amount(5, 2).unwrap(), 3);
/// assert!(per_person_amount(100, 0).is_err());
/// ```
pub fn per_person_amount(amount: i64, participants: usize) -> ResultEngine<i64> {
    if amount <= 0 {
        return Err(EngineError::MalformedExpense(
            "amount must be > 0".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::MalformedExpense(format!(
            "amount must be <= {MAX_AMOUNT}"
        )));
    }
    if participants == 0 {
        return Err(EngineError::MalformedExpense(
            "participants must not be empty".to_string(),
        ));
    }
    let overflow = || EngineError::MalformedExpense("amount too large".to_string());
    let count = i64::try_from(participants).map_err(|_| overflow())?;
    let numerator = amount
        .checked_mul(2)
        .and_then(|v| v.checked_add(count))
        .ok_or_else(overflow)?;
    let denominator = count.checked_mul(2).ok_or_else(overflow)?;
    Ok(numerator / denominator)
}

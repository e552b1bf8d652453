//! Member removal.
//!
//! Removing a member touches every expense that references them:
//!
//! - expenses **paid** by the member need a new payer, chosen by the caller
//!   among the remaining participants;
//! - expenses the member **participated** in lose that participant and get
//!   their per-person share recomputed;
//! - expenses left without participants are deleted.
//!
//! Afterwards expense and member ids are renumbered densely and every member
//! reference inside expenses is rewritten to the new ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Expense, ExpenseId, Group, MemberId, ResultEngine, group::reindex_expenses,
};

/// An expense paid by a member about to be removed that survives the removal
/// and therefore needs a new payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReassignment {
    pub expense_id: ExpenseId,
    pub title: String,
    pub amount: i64,
    /// Participants left once the member is removed (current ids).
    pub remaining_participants: Vec<MemberId>,
    /// Suggested payer: the first remaining participant.
    pub suggested_payer: MemberId,
}

/// List the expenses that need a new payer before `member_id` can be removed.
pub fn pending_reassignments(
    group: &Group,
    member_id: MemberId,
) -> ResultEngine<Vec<PendingReassignment>> {
    group.member(member_id)?;
    Ok(group
        .expenses
        .iter()
        .filter(|e| e.payer_id == member_id)
        .filter_map(|expense| {
            let remaining = without(&expense.participants, member_id);
            let suggested_payer = *remaining.first()?;
            Some(PendingReassignment {
                expense_id: expense.id,
                title: expense.title.clone(),
                amount: expense.amount,
                remaining_participants: remaining,
                suggested_payer,
            })
        })
        .collect())
}

/// Remove `member_id` from `group`, repairing every expense.
///
/// `reassignments` maps each surviving expense paid by the member to its new
/// payer (a current member id, which must be one of the remaining
/// participants). See [`pending_reassignments`].
///
/// The returned group has dense member and expense ids; `last_updated` is
/// left untouched.
pub fn remove_member(
    group: &Group,
    member_id: MemberId,
    reassignments: &HashMap<ExpenseId, MemberId>,
) -> ResultEngine<Group> {
    if group.members.len() <= 1 {
        return Err(EngineError::InvariantViolation(
            "cannot remove the last member of a group".to_string(),
        ));
    }
    group.member(member_id)?;

    for expense_id in reassignments.keys() {
        let paid_by_member = group
            .expenses
            .get(*expense_id)
            .is_some_and(|e| e.payer_id == member_id);
        if !paid_by_member {
            return Err(EngineError::InvalidReassignment(format!(
                "expense {expense_id} is not paid by member {member_id}"
            )));
        }
    }

    // Repair expenses, still using the current member ids.
    let mut expenses: Vec<Expense> = Vec::with_capacity(group.expenses.len());
    for expense in &group.expenses {
        if let Some(repaired) = repair_expense(expense, member_id, reassignments)? {
            expenses.push(repaired);
        }
    }
    reindex_expenses(&mut expenses);

    // Old position -> new position, `None` for the removed member.
    let mut new_ids: Vec<Option<MemberId>> = Vec::with_capacity(group.members.len());
    let mut members = Vec::with_capacity(group.members.len() - 1);
    for member in &group.members {
        if member.id == member_id {
            new_ids.push(None);
            continue;
        }
        new_ids.push(Some(members.len()));
        let mut kept = member.clone();
        kept.id = members.len();
        members.push(kept);
    }

    let remap = |old: MemberId| -> ResultEngine<MemberId> {
        new_ids.get(old).copied().flatten().ok_or_else(|| {
            EngineError::InvariantViolation(format!(
                "expense still references removed member {old}"
            ))
        })
    };
    for expense in &mut expenses {
        expense.payer_id = remap(expense.payer_id)?;
        expense.participants = expense
            .participants
            .iter()
            .map(|p| remap(*p))
            .collect::<ResultEngine<_>>()?;
    }

    tracing::debug!(
        group_id = %group.id,
        member_id,
        expenses_before = group.expenses.len(),
        expenses_after = expenses.len(),
        "member removed"
    );

    Ok(Group {
        members,
        expenses,
        ..group.clone()
    })
}

/// Returns the repaired expense, or `None` if it has to be deleted.
fn repair_expense(
    expense: &Expense,
    member_id: MemberId,
    reassignments: &HashMap<ExpenseId, MemberId>,
) -> ResultEngine<Option<Expense>> {
    let remaining = without(&expense.participants, member_id);
    if remaining.is_empty() {
        return Ok(None);
    }

    let mut repaired = expense.clone();
    if expense.payer_id == member_id {
        let new_payer = reassignments.get(&expense.id).copied().ok_or_else(|| {
            EngineError::InvalidReassignment(format!(
                "expense {} needs a new payer",
                expense.id
            ))
        })?;
        if !remaining.contains(&new_payer) {
            return Err(EngineError::InvalidReassignment(format!(
                "member {new_payer} is not a remaining participant of expense {}",
                expense.id
            )));
        }
        repaired.payer_id = new_payer;
    } else if remaining.len() == expense.participants.len() {
        return Ok(Some(repaired));
    }

    repaired.participants = remaining;
    repaired.recompute_share()?;
    Ok(Some(repaired))
}

fn without(participants: &[MemberId], member_id: MemberId) -> Vec<MemberId> {
    participants
        .iter()
        .copied()
        .filter(|p| *p != member_id)
        .collect()
}

//! The `Group` snapshot holds members and expenses.
//!
//! A group is treated as an immutable snapshot: every operation returns a new
//! `Group` and leaves the receiver untouched. Persistence writes the returned
//! snapshot back as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Expense, ExpenseId, InvitePolicy, Member, MemberId, NewExpense, NewMember,
    ResultEngine, enrollment, expense::MAX_AMOUNT,
};

/// Minimum number of members when a group is created.
pub const MIN_CREATION_MEMBERS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub invite: Option<InvitePolicy>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Group {
    /// Create a group, enrolling `members` in order.
    pub fn new(
        id: String,
        name: &str,
        description: &str,
        members: Vec<NewMember>,
        invite: InvitePolicy,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidGroup(
                "group name must not be empty".to_string(),
            ));
        }
        if members.len() < MIN_CREATION_MEMBERS {
            return Err(EngineError::InvalidGroup(format!(
                "a group needs at least {MIN_CREATION_MEMBERS} members"
            )));
        }

        let mut enrolled = Vec::with_capacity(members.len());
        for member in members {
            enrolled = enrollment::enroll(&enrolled, member, now)?;
        }

        Ok(Self {
            id,
            name: name.to_string(),
            description: description.trim().to_string(),
            members: enrolled,
            expenses: Vec::new(),
            invite: Some(invite),
            created_at: now,
            last_updated: now,
        })
    }

    pub fn member(&self, id: MemberId) -> ResultEngine<&Member> {
        self.members
            .get(id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("member {id}")))
    }

    pub fn expense(&self, id: ExpenseId) -> ResultEngine<&Expense> {
        self.expenses
            .get(id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))
    }

    /// Sum of every expense amount. Validated groups stay within
    /// [`MAX_AMOUNT`].
    pub fn total_expenses(&self) -> i64 {
        self.expenses
            .iter()
            .fold(0i64, |total, e| total.saturating_add(e.amount))
    }

    /// Check every group invariant: at least one member, dense ids and
    /// expenses referencing current members only.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.members.is_empty() {
            return Err(EngineError::InvariantViolation(
                "a group must have at least one member".to_string(),
            ));
        }
        for (pos, member) in self.members.iter().enumerate() {
            if member.id != pos {
                return Err(EngineError::InvariantViolation(format!(
                    "member at position {pos} has id {}",
                    member.id
                )));
            }
        }
        for (pos, expense) in self.expenses.iter().enumerate() {
            if expense.id != pos {
                return Err(EngineError::InvariantViolation(format!(
                    "expense at position {pos} has id {}",
                    expense.id
                )));
            }
            expense.validate(self.members.len())?;
        }
        ensure_total_within_limit(&self.expenses)
    }

    /// Enroll a new member.
    pub fn add_member(&self, new: NewMember, joined_at: DateTime<Utc>) -> ResultEngine<Group> {
        let members = enrollment::enroll(&self.members, new, joined_at)?;
        Ok(Self {
            members,
            ..self.clone()
        })
    }

    /// Edit the contact details of a member.
    pub fn update_member(&self, id: MemberId, patch: NewMember) -> ResultEngine<Group> {
        let members = enrollment::update_member(&self.members, id, patch)?;
        Ok(Self {
            members,
            ..self.clone()
        })
    }

    /// Record a new expense with the next dense id.
    pub fn add_expense(&self, new: NewExpense) -> ResultEngine<Group> {
        let expense = Expense::new(self.expenses.len(), new, self.members.len())?;
        let mut next = self.clone();
        next.expenses.push(expense);
        ensure_total_within_limit(&next.expenses)?;
        Ok(next)
    }

    /// Replace the fields of an expense, recomputing the per-person share.
    pub fn update_expense(&self, id: ExpenseId, new: NewExpense) -> ResultEngine<Group> {
        self.expense(id)?;
        let expense = Expense::new(id, new, self.members.len())?;
        let mut next = self.clone();
        next.expenses[id] = expense;
        ensure_total_within_limit(&next.expenses)?;
        Ok(next)
    }

    /// Delete an expense and re-index the remaining ones.
    pub fn delete_expense(&self, id: ExpenseId) -> ResultEngine<Group> {
        self.expense(id)?;
        let mut next = self.clone();
        next.expenses.remove(id);
        reindex_expenses(&mut next.expenses);
        Ok(next)
    }

    /// Change the invite policy of the group.
    pub fn update_invite(
        &self,
        allow_invites: Option<bool>,
        max_members: Option<u32>,
    ) -> ResultEngine<Group> {
        let mut next = self.clone();
        let invite = next
            .invite
            .as_mut()
            .ok_or_else(|| EngineError::KeyNotFound("invite code".to_string()))?;
        invite.update(allow_invites, max_members)?;
        Ok(next)
    }
}

fn ensure_total_within_limit(expenses: &[Expense]) -> ResultEngine<()> {
    let total = expenses
        .iter()
        .try_fold(0i64, |total, e| total.checked_add(e.amount))
        .filter(|total| *total <= MAX_AMOUNT);
    match total {
        Some(_) => Ok(()),
        None => Err(EngineError::MalformedExpense(format!(
            "group expenses must not exceed {MAX_AMOUNT} in total"
        ))),
    }
}

pub(crate) fn reindex_expenses(expenses: &mut [Expense]) {
    for (pos, expense) in expenses.iter_mut().enumerate() {
        expense.id = pos;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub(crate) fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    pub(crate) fn new_expense(
        amount: i64,
        payer_id: MemberId,
        participants: Vec<MemberId>,
    ) -> NewExpense {
        NewExpense {
            title: "Dinner".to_string(),
            amount,
            payer_id,
            participants,
            date: date(),
        }
    }

    /// Group with members named after `names`, phones `010-000<i>`.
    pub(crate) fn group_with(names: &[&str]) -> Group {
        let now = Utc::now();
        let mut group = Group::new(
            "group-1".to_string(),
            "Trip",
            "Jeju",
            names
                .iter()
                .take(2)
                .enumerate()
                .map(|(i, n)| NewMember::new(n, &format!("010-000{i}"), "bank"))
                .collect(),
            InvitePolicy::generate("http://localhost:3000"),
            now,
        )
        .unwrap();
        for (i, name) in names.iter().enumerate().skip(2) {
            group = group
                .add_member(NewMember::new(name, &format!("010-000{i}"), "bank"), now)
                .unwrap();
        }
        group
    }

    #[test]
    fn new_requires_name_and_two_members() {
        let now = Utc::now();
        let invite = InvitePolicy::generate("http://localhost:3000");
        let err = Group::new(
            "g".to_string(),
            " ",
            "",
            vec![NewMember::new("A", "1", "x"), NewMember::new("B", "2", "x")],
            invite.clone(),
            now,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidGroup(_)));

        let err = Group::new(
            "g".to_string(),
            "Trip",
            "",
            vec![NewMember::new("A", "1", "x")],
            invite.clone(),
            now,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidGroup(_)));

        let err = Group::new(
            "g".to_string(),
            "Trip",
            "",
            vec![NewMember::new("A", "1", "x"), NewMember::new("a", "2", "x")],
            invite,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateMember(_)));
    }

    #[test]
    fn new_assigns_dense_ids_and_colors() {
        let group = group_with(&["A", "B", "C"]);
        let ids: Vec<_> = group.members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(group.members[2].color, crate::color_for(2));
        assert!(group.validate().is_ok());
    }

    #[test]
    fn add_update_delete_expense_keeps_ids_dense() {
        let group = group_with(&["A", "B", "C"]);
        let group = group.add_expense(new_expense(300, 0, vec![0, 1, 2])).unwrap();
        let group = group.add_expense(new_expense(150, 1, vec![1, 2])).unwrap();
        let group = group.add_expense(new_expense(90, 2, vec![0, 2])).unwrap();
        assert_eq!(group.expenses[1].per_person_amount, 75);

        let group = group.update_expense(1, new_expense(200, 1, vec![0, 1])).unwrap();
        assert_eq!(group.expenses[1].per_person_amount, 100);
        assert_eq!(group.expenses[1].payer_id, 1);

        let group = group.delete_expense(0).unwrap();
        let ids: Vec<_> = group.expenses.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(group.expenses[0].amount, 200);
        assert_eq!(group.expenses[1].amount, 90);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn expense_operations_reject_unknown_ids() {
        let group = group_with(&["A", "B"]);
        assert!(matches!(
            group.delete_expense(0),
            Err(EngineError::KeyNotFound(_))
        ));
        assert!(matches!(
            group.update_expense(3, new_expense(10, 0, vec![0])),
            Err(EngineError::KeyNotFound(_))
        ));
        assert!(matches!(
            group.add_expense(new_expense(10, 2, vec![0])),
            Err(EngineError::MalformedExpense(_))
        ));
    }

    #[test]
    fn operations_do_not_mutate_the_snapshot() {
        let group = group_with(&["A", "B"]);
        let before = group.clone();
        let _ = group.add_expense(new_expense(10, 0, vec![0, 1])).unwrap();
        let _ = group.add_member(NewMember::new("C", "9", "x"), Utc::now()).unwrap();
        assert_eq!(group, before);
    }

    #[test]
    fn validate_rejects_gaps() {
        let mut group = group_with(&["A", "B"]);
        group.members[1].id = 5;
        assert!(matches!(
            group.validate(),
            Err(EngineError::InvariantViolation(_))
        ));

        let mut group = group_with(&["A", "B"]);
        group.members.clear();
        assert!(matches!(
            group.validate(),
            Err(EngineError::InvariantViolation(_))
        ));
    }

    #[test]
    fn group_total_is_capped() {
        let half = MAX_AMOUNT / 2;
        let group = group_with(&["A", "B"])
            .add_expense(new_expense(half, 0, vec![1]))
            .unwrap()
            .add_expense(new_expense(half, 0, vec![1]))
            .unwrap();
        assert_eq!(group.total_expenses(), MAX_AMOUNT);
        assert!(matches!(
            group.add_expense(new_expense(1, 0, vec![1])),
            Err(EngineError::MalformedExpense(_))
        ));
        assert!(matches!(
            group.update_expense(1, new_expense(half + 1, 0, vec![1])),
            Err(EngineError::MalformedExpense(_))
        ));
    }

    #[test]
    fn validate_rejects_oversized_totals() {
        let mut group = group_with(&["A", "B"])
            .add_expense(new_expense(10, 0, vec![1]))
            .unwrap();
        let huge = (i64::MAX - 1) / 2;
        for id in 0..3 {
            let mut expense = group.expenses[0].clone();
            expense.id = id;
            expense.amount = huge;
            expense.per_person_amount = huge;
            if id == 0 {
                group.expenses[0] = expense;
            } else {
                group.expenses.push(expense);
            }
        }
        assert!(matches!(
            group.validate(),
            Err(EngineError::MalformedExpense(_))
        ));
        assert_eq!(group.total_expenses(), i64::MAX);
        // Pure helpers stay total on unvalidated input.
        let _ = crate::compute_settlement(&group.expenses);
        let _ = crate::SettlementReport::build(&group);
    }

    #[test]
    fn update_invite_changes_policy() {
        let group = group_with(&["A", "B"]);
        let group = group.update_invite(Some(false), Some(5)).unwrap();
        let invite = group.invite.as_ref().unwrap();
        assert!(!invite.allow_invites);
        assert_eq!(invite.max_members, 5);
    }
}

use crate::{ExpenseId, Group, NewExpense, ResultEngine, store::Fields};

use super::Engine;

impl Engine {
    /// Record an expense split equally among its participants.
    pub async fn add_expense(&self, group_id: &str, expense: NewExpense) -> ResultEngine<Group> {
        self.mutate_group(group_id, Fields::EXPENSES, |group| group.add_expense(expense))
            .await
    }

    /// Replace an expense, recomputing its per-person amount.
    pub async fn update_expense(
        &self,
        group_id: &str,
        expense_id: ExpenseId,
        expense: NewExpense,
    ) -> ResultEngine<Group> {
        self.mutate_group(group_id, Fields::EXPENSES, |group| {
            group.update_expense(expense_id, expense)
        })
        .await
    }

    /// Delete an expense; later expenses shift down one id.
    pub async fn delete_expense(&self, group_id: &str, expense_id: ExpenseId) -> ResultEngine<Group> {
        self.mutate_group(group_id, Fields::EXPENSES, |group| group.delete_expense(expense_id))
            .await
    }
}

use std::collections::HashMap;

use chrono::Utc;

use crate::{
    ExpenseId, Group, MemberId, NewMember, PendingReassignment, ResultEngine,
    pending_reassignments, remove_member, store::Fields,
};

use super::Engine;

impl Engine {
    /// Enroll a new member. Invite policy is not checked here, see
    /// [`Engine::join_by_invite`].
    pub async fn add_member(&self, group_id: &str, new_member: NewMember) -> ResultEngine<Group> {
        let group = self
            .mutate_group(group_id, Fields::MEMBERS, |group| {
                group.add_member(new_member, Utc::now())
            })
            .await?;
        tracing::info!(group_id, members = group.members.len(), "member enrolled");
        Ok(group)
    }

    /// Edit name, phone and account of a member.
    pub async fn update_member(
        &self,
        group_id: &str,
        member_id: MemberId,
        patch: NewMember,
    ) -> ResultEngine<Group> {
        self.mutate_group(group_id, Fields::MEMBERS, |group| {
            group.update_member(member_id, patch)
        })
        .await
    }

    /// Expenses that need a new payer before `member_id` can be removed.
    pub async fn pending_reassignments(
        &self,
        group_id: &str,
        member_id: MemberId,
    ) -> ResultEngine<Vec<PendingReassignment>> {
        let group = self.group(group_id).await?;
        pending_reassignments(&group, member_id)
    }

    /// Remove a member, repairing and renumbering every expense.
    ///
    /// Both `members` and `expenses` are rewritten as a whole.
    pub async fn remove_member(
        &self,
        group_id: &str,
        member_id: MemberId,
        reassignments: &HashMap<ExpenseId, MemberId>,
    ) -> ResultEngine<Group> {
        let result = self
            .mutate_group(group_id, Fields::ROSTER, |group| {
                remove_member(group, member_id, reassignments)
            })
            .await;
        match &result {
            Ok(group) => tracing::info!(
                group_id,
                member_id,
                members = group.members.len(),
                expenses = group.expenses.len(),
                "member removed"
            ),
            Err(err) => tracing::warn!(group_id, member_id, "member removal refused: {err}"),
        }
        result
    }
}

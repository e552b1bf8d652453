use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod member {
    use super::*;

    /// Request body for enrolling or editing a member.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub name: String,
        pub phone: String,
        /// Bank account the member wants to be paid on.
        pub account: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: usize,
        pub name: String,
        pub phone: String,
        pub account: String,
        /// Display colour, `#rrggbb`.
        pub color: String,
        pub joined_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    /// Request body for recording or editing an expense.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        /// Whole currency units, must be > 0.
        pub amount: i64,
        pub payer_id: usize,
        pub participants: Vec<usize>,
        pub date: NaiveDate,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: usize,
        pub title: String,
        pub amount: i64,
        pub payer_id: usize,
        pub participants: Vec<usize>,
        pub per_person_amount: i64,
        pub date: NaiveDate,
    }
}

pub mod invite {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct InviteView {
        pub code: String,
        pub link: String,
        pub allow_invites: bool,
        pub max_members: u32,
    }

    /// Request body for changing the invite policy. Absent fields are kept.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct InviteUpdate {
        pub allow_invites: Option<bool>,
        pub max_members: Option<u32>,
    }

    /// What a prospective member sees before joining.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct InvitePreview {
        pub group_id: String,
        pub name: String,
        pub description: String,
        pub members: Vec<String>,
        pub max_members: u32,
    }
}

pub mod group {
    use super::*;
    use crate::{
        expense::ExpenseView,
        invite::InviteView,
        member::{MemberNew, MemberView},
    };

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
        /// At least two members.
        pub members: Vec<MemberNew>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: String,
        pub name: String,
        pub description: String,
        pub members: Vec<MemberView>,
        pub expenses: Vec<ExpenseView>,
        /// Missing only on groups created before invite links existed.
        pub invite: Option<InviteView>,
        pub created_at: DateTime<Utc>,
        pub last_updated: DateTime<Utc>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: usize,
        pub to: usize,
        pub amount: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SettlementResponse {
        pub settlements: Vec<SettlementView>,
        pub total_expenses: i64,
    }
}

pub mod removal {
    use super::*;

    /// An expense that needs a new payer before the member can go.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PendingReassignmentView {
        pub expense_id: usize,
        pub title: String,
        pub amount: i64,
        pub remaining_participants: Vec<usize>,
        pub suggested_payer: usize,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PendingReassignments {
        pub pending: Vec<PendingReassignmentView>,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct Reassignment {
        pub expense_id: usize,
        /// Current id of the new payer.
        pub payer_id: usize,
    }

    /// Request body for removing a member.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct RemoveMember {
        #[serde(default)]
        pub reassignments: Vec<Reassignment>,
    }
}

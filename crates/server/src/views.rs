//! Conversions between engine values and API bodies.

use api_types::{
    expense::{ExpenseNew, ExpenseView},
    group::GroupView,
    invite::InviteView,
    member::{MemberNew, MemberView},
    removal::PendingReassignmentView,
    settlement::SettlementView,
};
use engine::{
    Expense, Group, InvitePolicy, Member, NewExpense, NewMember, PendingReassignment, Settlement,
};

pub(crate) fn group_view(group: &Group) -> GroupView {
    GroupView {
        id: group.id.clone(),
        name: group.name.clone(),
        description: group.description.clone(),
        members: group.members.iter().map(member_view).collect(),
        expenses: group.expenses.iter().map(expense_view).collect(),
        invite: group.invite.as_ref().map(invite_view),
        created_at: group.created_at,
        last_updated: group.last_updated,
    }
}

fn member_view(member: &Member) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name.clone(),
        phone: member.phone.clone(),
        account: member.account.clone(),
        color: member.color.clone(),
        joined_at: member.joined_at,
    }
}

fn expense_view(expense: &Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        title: expense.title.clone(),
        amount: expense.amount,
        payer_id: expense.payer_id,
        participants: expense.participants.clone(),
        per_person_amount: expense.per_person_amount,
        date: expense.date,
    }
}

fn invite_view(invite: &InvitePolicy) -> InviteView {
    InviteView {
        code: invite.code.clone(),
        link: invite.link.clone(),
        allow_invites: invite.allow_invites,
        max_members: invite.max_members,
    }
}

pub(crate) fn settlement_view(settlement: &Settlement) -> SettlementView {
    SettlementView {
        from: settlement.from,
        to: settlement.to,
        amount: settlement.amount,
    }
}

pub(crate) fn pending_view(pending: PendingReassignment) -> PendingReassignmentView {
    PendingReassignmentView {
        expense_id: pending.expense_id,
        title: pending.title,
        amount: pending.amount,
        remaining_participants: pending.remaining_participants,
        suggested_payer: pending.suggested_payer,
    }
}

pub(crate) fn new_member(member: MemberNew) -> NewMember {
    NewMember {
        name: member.name,
        phone: member.phone,
        account: member.account,
    }
}

pub(crate) fn new_expense(expense: ExpenseNew) -> NewExpense {
    NewExpense {
        title: expense.title,
        amount: expense.amount,
        payer_id: expense.payer_id,
        participants: expense.participants,
        date: expense.date,
    }
}

//! Group expense splitting.
//!
//! The pure core ([`compute_settlement`], [`remove_member`], [`enroll`] and
//! the [`Group`] operations) works on in-memory snapshots. [`Engine`] wraps it
//! with SQLite persistence and change notification.

pub use enrollment::{enroll, update_member};
pub use error::EngineError;
pub use expense::{Expense, ExpenseId, MAX_AMOUNT, NewExpense, per_person_amount};
pub use group::{Group, MIN_CREATION_MEMBERS};
pub use invite::{
    DEFAULT_MAX_MEMBERS, InvitePolicy, generate_invite_code, invite_link, is_valid_invite_code,
};
pub use member::{Member, MemberId, NewMember, PALETTE, color_for};
pub use ops::{BackfillReport, Engine, EngineBuilder};
pub use reconcile::{PendingReassignment, pending_reassignments, remove_member};
pub use report::{ExpenseLine, MemberLine, SettlementLine, SettlementReport};
pub use settlement::{Settlement, compute_settlement, net_positions};

mod enrollment;
mod error;
mod expense;
mod group;
mod invite;
mod member;
mod ops;
mod reconcile;
mod report;
mod settlement;
mod store;
mod watch;

type ResultEngine<T> = Result<T, EngineError>;

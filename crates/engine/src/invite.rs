//! Invite links.
//!
//! Every group carries an 8 character invite code (`A-Z0-9`). The link shared
//! with friends is `<public_url>/invite/<code>`; joining through it is allowed
//! only while the group accepts invites and has room left.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub const INVITE_CODE_LEN: usize = 8;
pub const DEFAULT_MAX_MEMBERS: u32 = 20;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Enrollment policy of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitePolicy {
    pub code: String,
    pub link: String,
    pub allow_invites: bool,
    pub max_members: u32,
}

impl InvitePolicy {
    /// Fresh policy with a new code, invites enabled and the default cap.
    pub fn generate(public_url: &str) -> Self {
        let code = generate_invite_code();
        Self {
            link: invite_link(public_url, &code),
            code,
            allow_invites: true,
            max_members: DEFAULT_MAX_MEMBERS,
        }
    }

    /// Check a new member may join a group that currently has `member_count`
    /// members.
    pub fn ensure_can_join(&self, member_count: usize) -> ResultEngine<()> {
        if !self.allow_invites {
            return Err(EngineError::InviteRejected(
                "the group is not accepting invites".to_string(),
            ));
        }
        if member_count >= self.max_members as usize {
            return Err(EngineError::InviteRejected(format!(
                "the group already reached {} members",
                self.max_members
            )));
        }
        Ok(())
    }

    /// Apply a policy change. `max_members` must be at least 1.
    pub fn update(&mut self, allow_invites: Option<bool>, max_members: Option<u32>) -> ResultEngine<()> {
        if let Some(max) = max_members {
            if max == 0 {
                return Err(EngineError::InvalidGroup(
                    "max_members must be > 0".to_string(),
                ));
            }
            self.max_members = max;
        }
        if let Some(allow) = allow_invites {
            self.allow_invites = allow;
        }
        Ok(())
    }
}

/// Generate a random invite code.
///
/// Digits are taken base 36 from the low end of a UUID v4, which is random;
/// the fixed version and variant bits sit far above them.
pub fn generate_invite_code() -> String {
    let base = ALPHABET.len() as u128;
    let mut value = Uuid::new_v4().as_u128();
    let mut code = String::with_capacity(INVITE_CODE_LEN);
    for _ in 0..INVITE_CODE_LEN {
        code.push(ALPHABET[(value % base) as usize] as char);
        value /= base;
    }
    code
}

/// Returns `true` if `code` has the invite code shape.
pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

pub fn invite_link(public_url: &str, code: &str) -> String {
    format!("{}/invite/{code}", public_url.trim_end_matches('/'))
}

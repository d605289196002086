//! Leaderboard ranking over per-user complaint counts.

use serde::Serialize;

/// A user's position on the leaderboard.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1-based position among all ranked users. A user with no complaints
    /// ranks one past the end (`total_users + 1`).
    pub rank: i64,
    /// The number of distinct users with at least one complaint.
    pub total_users: i64,
}

/// Compute the standing of `target` from `(user_identifier, count)` pairs.
///
/// Identifiers are ordered by count descending; ties break by identifier
/// lexical order so the result does not depend on enumeration order.
pub fn standing(mut counts: Vec<(String, i64)>, target: &str) -> Standing {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_users = counts.len() as i64;
    let rank = counts
        .iter()
        .position(|(user, _)| user == target)
        .map_or(total_users + 1, |pos| pos as i64 + 1);

    Standing { rank, total_users }
}

//! Gate engine: the pure rules deciding what each ornament shows.
//!
//! Everything here is a function of its inputs. Ledger writes happen in the
//! service layer so passphrase verification stays side-effect free and
//! independently testable.

use crate::catalog::Catalog;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Derived state of one ornament for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Unlock date has not arrived; dominates every other state.
    Locked,
    /// Already in the ledger, or admin mode is active.
    Opened,
    /// Date has arrived but the passphrase has not been entered.
    Gated,
}

/// Result of checking one passphrase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Success,
    Mismatch,
    Unavailable,
}

/// Index of the last ornament whose date has arrived, or `None` when nothing
/// has unlocked yet.
///
/// Admin mode treats the whole catalog as unlocked. The scan deliberately
/// keeps the *last* qualifying index rather than stopping at the first
/// non-qualifying one: the catalog is assumed sorted by date, but the rule
/// holds for unsorted input too.
pub fn latest_unlocked_index(catalog: &Catalog, today: NaiveDate, admin: bool) -> Option<usize> {
    if admin {
        return catalog.len().checked_sub(1);
    }

    let mut latest = None;
    for (index, entry) in catalog.iter().enumerate() {
        if entry.ornament.date <= today {
            latest = Some(index);
        }
    }
    latest
}

/// Classify one ornament given the unlock horizon computed for this pass.
///
/// An index beyond the horizon is `Locked` even if it already sits in the
/// ledger.
pub fn classify(
    index: usize,
    latest_unlocked: Option<usize>,
    ledger: &BTreeSet<usize>,
    admin: bool,
) -> GateState {
    let beyond_horizon = match latest_unlocked {
        Some(latest) => index > latest,
        None => true,
    };
    if beyond_horizon {
        return GateState::Locked;
    }

    if admin || ledger.contains(&index) {
        GateState::Opened
    } else {
        GateState::Gated
    }
}

/// Check a passphrase attempt against the expected entry.
///
/// `expected` of `None` means the table has no usable entry for this index
/// (short table or empty string), which is a data-availability problem rather
/// than a wrong guess. Attempts are trimmed and compared case-insensitively.
/// Admin mode never reaches this path; it is a display bypass applied before
/// a gate is shown.
pub fn attempt_unlock(attempt: &str, expected: Option<&str>) -> UnlockOutcome {
    let Some(expected) = expected.filter(|value| !value.is_empty()) else {
        return UnlockOutcome::Unavailable;
    };

    if attempt.trim().to_lowercase() == expected.to_lowercase() {
        UnlockOutcome::Success
    } else {
        UnlockOutcome::Mismatch
    }
}

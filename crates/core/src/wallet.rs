//! Wallet ledger vocabulary and balance derivation.
//!
//! Balances are never stored. `available` is credits minus debits over the
//! append-only ledger; `pending` is the cashback still awaiting review.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feedback::FeedbackStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Cashback,
    SpinCost,
    SpinReward,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgerKind::Cashback => "cashback",
            LedgerKind::SpinCost => "spin_cost",
            LedgerKind::SpinReward => "spin_reward",
        }
    }

    /// Direction every entry of this kind is written with.
    pub fn direction(self) -> LedgerDirection {
        match self {
            LedgerKind::Cashback | LedgerKind::SpinReward => LedgerDirection::Credit,
            LedgerKind::SpinCost => LedgerDirection::Debit,
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    Credit,
    Debit,
}

impl LedgerDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgerDirection::Credit => "credit",
            LedgerDirection::Debit => "debit",
        }
    }

    /// Signed contribution of `amount` to the available balance.
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            LedgerDirection::Credit => amount,
            LedgerDirection::Debit => -amount,
        }
    }
}

impl FromStr for LedgerDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(LedgerDirection::Credit),
            "debit" => Ok(LedgerDirection::Debit),
            other => Err(CoreError::Internal(format!("Unknown ledger direction '{other}'"))),
        }
    }
}

/// Sum of credits minus sum of debits.
pub fn available_balance<I>(entries: I) -> i64
where
    I: IntoIterator<Item = (LedgerDirection, i64)>,
{
    entries
        .into_iter()
        .map(|(direction, amount)| direction.signed(amount))
        .sum()
}

/// Cashback of feedbacks that have not reached a terminal status.
pub fn pending_balance<I>(feedbacks: I) -> i64
where
    I: IntoIterator<Item = (FeedbackStatus, i64)>,
{
    feedbacks
        .into_iter()
        .filter(|(status, _)| !status.is_terminal())
        .map(|(_, cashback)| cashback)
        .sum()
}

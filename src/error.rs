//! Error types for the simulation core.
//!
//! Nothing in the core is fatal: every variant here is a signal the caller
//! absorbs as a no-op for the current frame.

use thiserror::Error;

use crate::sim::upgrades::UpgradeKind;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Object pool has no free slot and is at its maximum size.
    #[error("object pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// Released a handle that is not currently checked out.
    #[error("object is not in use by this pool")]
    NotInUse,

    /// Upgrade card index outside of the offered set.
    #[error("invalid selection {index} (offered {offered})")]
    InvalidSelection { index: usize, offered: usize },

    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(String),

    #[error("unknown weapon `{0}`")]
    UnknownWeapon(String),

    #[error("unknown enemy `{0}`")]
    UnknownEnemy(String),

    #[error("unknown power-up `{0}`")]
    UnknownPowerUp(String),

    /// Upgrade levels never decrease within a run.
    #[error("upgrade {kind:?} cannot be applied with negative amount {amount}")]
    NegativeUpgrade { kind: UpgradeKind, amount: f32 },

    #[error("persistence failure: {0}")]
    Persistence(String),
}

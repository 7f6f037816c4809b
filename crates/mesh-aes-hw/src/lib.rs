//! Driver for the shared AES cipher peripheral.
//!
//! The peripheral is a process-wide singleton: one key/data register bank,
//! one pair of DMA channels, one operation in flight at a time. The driver
//! splits into three layers:
//!
//! - [`CipherRegisters`]: the raw read/write contract of the register file.
//!   A production target implements it over the memory-mapped block; hosts
//!   and tests plug in [`SimulatedCipher`].
//! - [`CipherEngine`]: the register-programming sequences for single-block
//!   (polled) and multi-block (DMA-streamed) operation, with every busy-wait
//!   bounded by a [`WaitBudget`].
//! - [`SharedEngine`]: the reentrancy guard serializing foreground and
//!   interrupt-context callers of the one physical engine.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod guard;
mod regs;
mod sim;

pub use crate::driver::{CipherEngine, Operation, WaitBudget};
pub use crate::guard::SharedEngine;
pub use crate::regs::{
    CipherRegisters, DmaDescriptor, DmaDirection, CTRL_DATA_FEED, CTRL_DECRYPT, CTRL_FINISHED,
};
pub use crate::sim::{SimStats, SimulatedCipher};

/// Driver-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The peripheral did not assert its finished flag within the poll
    /// budget. The operation must not be retried: the engine may be half-fed.
    #[error("cipher peripheral did not finish within {polls} status polls")]
    Timeout {
        /// Number of status polls spent before giving up.
        polls: u32,
    },
    /// A non-blocking request found the engine already mid-operation.
    #[error("cipher engine is busy with another operation")]
    Busy,
}

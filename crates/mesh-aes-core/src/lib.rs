//! Portable AES-128 implementation backing the mesh security layer.
//!
//! This crate follows FIPS-197 and provides:
//! - Key schedule expansion for AES-128.
//! - Single-block encryption and decryption over caller-supplied buffers.
//! - The substitution and round-constant tables shared with the rest of the
//!   workspace.
//!
//! Every operation is a pure function of its inputs; the crate holds no
//! state and is safe to call from any context, including interrupt-style
//! reentrant callers. Lookups are table-driven with no data-dependent
//! branching, but no further side-channel hardening is attempted.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod rounds;
mod schedule;
mod state;
pub mod tables;

pub use crate::cipher::{decrypt_block, encrypt_block};
pub use crate::schedule::{expand_key, Aes128Key, RoundKeys};
pub use crate::state::{Block, BLOCK_LEN};

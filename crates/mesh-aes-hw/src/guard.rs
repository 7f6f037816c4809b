//! Serialization of the one physical cipher engine.

use std::sync::{Mutex, PoisonError, TryLockError};

use crate::driver::CipherEngine;
use crate::regs::CipherRegisters;
use crate::Error;

/// Exclusive handle to the shared cipher engine.
///
/// The original firmware masks interrupts around the register sequence
/// because an interrupt handler may itself request an encryption (an
/// inbound-message integrity check) while foreground code is mid-operation.
/// The hosted rendition of that critical section is a mutex: [`Self::with`]
/// queues behind the current holder in lock-acquisition order, while
/// [`Self::try_with`] refuses with [`Error::Busy`] instead of blocking.
///
/// Operations are total-ordered by lock acquisition; no two register
/// sequences can interleave.
pub struct SharedEngine<R: CipherRegisters> {
    engine: Mutex<CipherEngine<R>>,
}

impl<R: CipherRegisters> SharedEngine<R> {
    /// Wraps an engine for shared use.
    pub fn new(engine: CipherEngine<R>) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    /// Runs `op` with exclusive access, blocking until the engine is free.
    pub fn with<T>(&self, op: impl FnOnce(&mut CipherEngine<R>) -> T) -> T {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut engine)
    }

    /// Runs `op` with exclusive access if the engine is free, otherwise
    /// returns [`Error::Busy`] without touching any register.
    pub fn try_with<T>(&self, op: impl FnOnce(&mut CipherEngine<R>) -> T) -> Result<T, Error> {
        match self.engine.try_lock() {
            Ok(mut engine) => Ok(op(&mut engine)),
            Err(TryLockError::WouldBlock) => Err(Error::Busy),
            Err(TryLockError::Poisoned(poisoned)) => Ok(op(&mut poisoned.into_inner())),
        }
    }
}

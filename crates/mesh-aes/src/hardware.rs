//! Hardware-accelerated backend.

use mesh_aes_core::{Aes128Key, Block};
use mesh_aes_hw::{CipherEngine, CipherRegisters, Operation, SharedEngine, WaitBudget};

use crate::backend::CipherBackend;
use crate::error::Result;

/// Backend driving the shared cipher peripheral.
///
/// All operations serialize through the engine's reentrancy guard; the
/// blocking calls queue in lock-acquisition order while the `try_` calls
/// surface `Busy`. Bulk operations use the DMA streaming path.
pub struct HardwareBackend<R: CipherRegisters + Send> {
    engine: SharedEngine<R>,
}

impl<R: CipherRegisters + Send> HardwareBackend<R> {
    /// Wraps a peripheral register binding with the default wait budget.
    pub fn new(regs: R) -> Self {
        Self {
            engine: SharedEngine::new(CipherEngine::new(regs)),
        }
    }

    /// Wraps a peripheral register binding with an explicit wait budget.
    pub fn with_wait_budget(regs: R, budget: WaitBudget) -> Self {
        Self {
            engine: SharedEngine::new(CipherEngine::with_wait_budget(regs, budget)),
        }
    }
}

impl<R: CipherRegisters + Send> CipherBackend for HardwareBackend<R> {
    fn name(&self) -> &'static str {
        "hardware"
    }

    fn encrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        let result = self
            .engine
            .with(|engine| engine.process_block(Operation::Encrypt, key, block))?;
        Ok(result)
    }

    fn decrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        let result = self
            .engine
            .with(|engine| engine.process_block(Operation::Decrypt, key, block))?;
        Ok(result)
    }

    fn try_encrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        let result = self
            .engine
            .try_with(|engine| engine.process_block(Operation::Encrypt, key, block))
            .and_then(|inner| inner)?;
        Ok(result)
    }

    fn try_decrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        let result = self
            .engine
            .try_with(|engine| engine.process_block(Operation::Decrypt, key, block))
            .and_then(|inner| inner)?;
        Ok(result)
    }

    fn encrypt_blocks(&self, key: &Aes128Key, data: &[u8], out: &mut [u8]) -> Result<()> {
        self.engine
            .with(|engine| engine.process_buffer(Operation::Encrypt, key, data, out))?;
        Ok(())
    }

    fn decrypt_blocks(&self, key: &Aes128Key, data: &[u8], out: &mut [u8]) -> Result<()> {
        self.engine
            .with(|engine| engine.process_buffer(Operation::Decrypt, key, data, out))?;
        Ok(())
    }
}

//! The backend contract both cipher implementations satisfy.

use mesh_aes_core::{Aes128Key, Block, BLOCK_LEN};

use crate::error::Result;

/// One cipher backend.
///
/// Both implementations are observably identical: for any key and block the
/// software core and the hardware engine produce the same bytes, so callers
/// never need to know which one was selected. Bulk operations default to a
/// per-block loop; the hardware backend overrides them with its DMA
/// streaming path. The `try_` variants never block on the shared engine;
/// for the software core, which has no shared resource, they are the same
/// call.
pub trait CipherBackend: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Encrypts one block, waiting for the engine if it is busy.
    fn encrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block>;

    /// Decrypts one block, waiting for the engine if it is busy.
    fn decrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block>;

    /// Encrypts one block, failing with `Busy` instead of waiting.
    fn try_encrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        self.encrypt_block(key, block)
    }

    /// Decrypts one block, failing with `Busy` instead of waiting.
    fn try_decrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        self.decrypt_block(key, block)
    }

    /// Encrypts `data` into `out`, both whole multiples of one block.
    /// Lengths are validated by the caller before this is reached.
    fn encrypt_blocks(&self, key: &Aes128Key, data: &[u8], out: &mut [u8]) -> Result<()> {
        for (src, dst) in data
            .chunks_exact(BLOCK_LEN)
            .zip(out.chunks_exact_mut(BLOCK_LEN))
        {
            let block: Block = src.try_into().expect("chunks are one block");
            dst.copy_from_slice(&self.encrypt_block(key, &block)?);
        }
        Ok(())
    }

    /// Decrypts `data` into `out`, both whole multiples of one block.
    fn decrypt_blocks(&self, key: &Aes128Key, data: &[u8], out: &mut [u8]) -> Result<()> {
        for (src, dst) in data
            .chunks_exact(BLOCK_LEN)
            .zip(out.chunks_exact_mut(BLOCK_LEN))
        {
            let block: Block = src.try_into().expect("chunks are one block");
            dst.copy_from_slice(&self.decrypt_block(key, &block)?);
        }
        Ok(())
    }
}

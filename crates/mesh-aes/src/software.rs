//! Pure-software backend.

use mesh_aes_core::{decrypt_block, encrypt_block, expand_key, Aes128Key, Block};

use crate::backend::CipherBackend;
use crate::error::Result;

/// The portable Rijndael core as a backend.
///
/// Touches only caller-owned memory, so it is freely reentrant and never
/// reports `Busy` or a timeout. The schedule is expanded per call; keys are
/// not retained.
pub struct SoftwareBackend;

impl CipherBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn encrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        Ok(encrypt_block(block, &expand_key(key)))
    }

    fn decrypt_block(&self, key: &Aes128Key, block: &Block) -> Result<Block> {
        Ok(decrypt_block(block, &expand_key(key)))
    }
}

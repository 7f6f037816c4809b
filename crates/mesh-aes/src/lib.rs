//! Unified AES-128 contract for the mesh security layer.
//!
//! The mesh network and transport layers derive their keys elsewhere and
//! come here for exactly one primitive: transform one 16-byte block (or a
//! run of them) under a 16-byte key. Two observably identical backends sit
//! behind one [`MeshCipher`] facade: the portable software core and the
//! hardware cipher peripheral. The backend is chosen once at
//! initialization and never re-evaluated per call.
//!
//! ```
//! use mesh_aes::MeshCipher;
//!
//! let cipher = MeshCipher::software();
//! let key = [0x0b; 16];
//! let ciphertext = cipher.encrypt(&key, b"one sixteen-byte").unwrap();
//! let plaintext = cipher.decrypt(&key, &ciphertext).unwrap();
//! assert_eq!(&plaintext, b"one sixteen-byte");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod error;
mod hardware;
mod software;

pub use crate::backend::CipherBackend;
pub use crate::error::{Error, Result};
pub use crate::hardware::HardwareBackend;
pub use crate::software::SoftwareBackend;
pub use mesh_aes_core::{Aes128Key, Block, BLOCK_LEN};

use mesh_aes_hw::CipherRegisters;

/// The engine facade handed to the mesh security layer.
///
/// Every operation takes the key per call; no key material is retained
/// between calls. All length validation happens here, before the selected
/// backend (and, for hardware, any register) is touched.
pub struct MeshCipher {
    backend: Box<dyn CipherBackend>,
}

impl MeshCipher {
    /// Selects the backend once: the hardware engine when the target
    /// provides a cipher peripheral binding, the software core otherwise.
    pub fn select<R>(peripheral: Option<R>) -> Self
    where
        R: CipherRegisters + Send + 'static,
    {
        match peripheral {
            Some(regs) => Self::with_backend(Box::new(HardwareBackend::new(regs))),
            None => Self::with_backend(Box::new(SoftwareBackend)),
        }
    }

    /// Engine over the portable software core.
    pub fn software() -> Self {
        Self::with_backend(Box::new(SoftwareBackend))
    }

    /// Engine over the hardware cipher peripheral.
    pub fn hardware<R>(peripheral: R) -> Self
    where
        R: CipherRegisters + Send + 'static,
    {
        Self::with_backend(Box::new(HardwareBackend::new(peripheral)))
    }

    /// Engine over an explicit backend implementation.
    pub fn with_backend(backend: Box<dyn CipherBackend>) -> Self {
        log::debug!("selected {} cipher backend", backend.name());
        Self { backend }
    }

    /// Name of the selected backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Encrypts one 16-byte block under a 16-byte key.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Block> {
        let key = check_key(key)?;
        let block = check_block(plaintext, "plaintext")?;
        self.backend.encrypt_block(&key, &block)
    }

    /// Decrypts one 16-byte block under a 16-byte key.
    pub fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Block> {
        let key = check_key(key)?;
        let block = check_block(ciphertext, "ciphertext")?;
        self.backend.decrypt_block(&key, &block)
    }

    /// Like [`Self::encrypt`], but fails with [`Error::Busy`] instead of
    /// waiting for the shared engine.
    pub fn try_encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Block> {
        let key = check_key(key)?;
        let block = check_block(plaintext, "plaintext")?;
        self.backend.try_encrypt_block(&key, &block)
    }

    /// Like [`Self::decrypt`], but fails with [`Error::Busy`] instead of
    /// waiting for the shared engine.
    pub fn try_decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Block> {
        let key = check_key(key)?;
        let block = check_block(ciphertext, "ciphertext")?;
        self.backend.try_decrypt_block(&key, &block)
    }

    /// Encrypts a contiguous run of whole blocks into `ciphertext`.
    pub fn encrypt_buffer(&self, key: &[u8], plaintext: &[u8], ciphertext: &mut [u8]) -> Result<()> {
        let key = check_key(key)?;
        check_buffers(plaintext, ciphertext)?;
        self.backend.encrypt_blocks(&key, plaintext, ciphertext)
    }

    /// Decrypts a contiguous run of whole blocks into `plaintext`.
    pub fn decrypt_buffer(&self, key: &[u8], ciphertext: &[u8], plaintext: &mut [u8]) -> Result<()> {
        let key = check_key(key)?;
        check_buffers(ciphertext, plaintext)?;
        self.backend.decrypt_blocks(&key, ciphertext, plaintext)
    }
}

fn check_key(key: &[u8]) -> Result<Aes128Key> {
    let bytes: [u8; BLOCK_LEN] = key.try_into().map_err(|_| Error::InvalidLength {
        context: "key",
        expected: BLOCK_LEN,
        actual: key.len(),
    })?;
    Ok(Aes128Key::from(bytes))
}

fn check_block(data: &[u8], context: &'static str) -> Result<Block> {
    data.try_into().map_err(|_| Error::InvalidLength {
        context,
        expected: BLOCK_LEN,
        actual: data.len(),
    })
}

fn check_buffers(input: &[u8], output: &[u8]) -> Result<()> {
    if input.is_empty() || input.len() % BLOCK_LEN != 0 {
        return Err(Error::InvalidLength {
            context: "input buffer",
            expected: input.len().div_ceil(BLOCK_LEN).max(1) * BLOCK_LEN,
            actual: input.len(),
        });
    }
    if output.len() != input.len() {
        return Err(Error::InvalidLength {
            context: "output buffer",
            expected: input.len(),
            actual: output.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_aes_hw::SimulatedCipher;
    use rand::RngCore;

    const NIST_KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const NIST_PLAIN: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    const NIST_CIPHER: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
        0x5a,
    ];

    fn both_backends() -> [MeshCipher; 2] {
        [
            MeshCipher::software(),
            MeshCipher::hardware(SimulatedCipher::new()),
        ]
    }

    #[test]
    fn fips197_vector_on_both_backends() {
        for cipher in both_backends() {
            assert_eq!(cipher.encrypt(&NIST_KEY, &NIST_PLAIN).unwrap(), NIST_CIPHER);
            assert_eq!(cipher.decrypt(&NIST_KEY, &NIST_CIPHER).unwrap(), NIST_PLAIN);
        }
    }

    #[test]
    fn round_trip_on_both_backends() {
        let mut rng = rand::thread_rng();
        for cipher in both_backends() {
            for _ in 0..25 {
                let mut key = [0u8; 16];
                let mut block = [0u8; 16];
                rng.fill_bytes(&mut key);
                rng.fill_bytes(&mut block);
                let ct = cipher.encrypt(&key, &block).unwrap();
                assert_eq!(cipher.decrypt(&key, &ct).unwrap(), block);
            }
        }
    }

    #[test]
    fn backends_agree_on_random_inputs() {
        let [software, hardware] = both_backends();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let mut key = [0u8; 16];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key);
            rng.fill_bytes(&mut block);
            assert_eq!(
                software.encrypt(&key, &block).unwrap(),
                hardware.encrypt(&key, &block).unwrap()
            );
            assert_eq!(
                software.decrypt(&key, &block).unwrap(),
                hardware.decrypt(&key, &block).unwrap()
            );
        }
    }

    #[test]
    fn bulk_matches_per_block_on_both_backends() {
        let mut rng = rand::thread_rng();
        for cipher in both_backends() {
            for blocks in [1usize, 2, 16] {
                let mut key = [0u8; 16];
                rng.fill_bytes(&mut key);
                let mut data = vec![0u8; blocks * BLOCK_LEN];
                rng.fill_bytes(&mut data);

                let mut bulk = vec![0u8; data.len()];
                cipher.encrypt_buffer(&key, &data, &mut bulk).unwrap();

                let mut singles = Vec::with_capacity(data.len());
                for chunk in data.chunks_exact(BLOCK_LEN) {
                    singles.extend_from_slice(&cipher.encrypt(&key, chunk).unwrap());
                }
                assert_eq!(bulk, singles);

                let mut recovered = vec![0u8; data.len()];
                cipher.decrypt_buffer(&key, &bulk, &mut recovered).unwrap();
                assert_eq!(recovered, data);
            }
        }
    }

    #[test]
    fn wrong_lengths_are_rejected_before_any_work() {
        for cipher in both_backends() {
            assert_eq!(
                cipher.encrypt(&NIST_KEY[..15], &NIST_PLAIN),
                Err(Error::InvalidLength {
                    context: "key",
                    expected: 16,
                    actual: 15,
                })
            );
            assert_eq!(
                cipher.encrypt(&NIST_KEY, &NIST_PLAIN[..7]),
                Err(Error::InvalidLength {
                    context: "plaintext",
                    expected: 16,
                    actual: 7,
                })
            );
            assert_eq!(
                cipher.decrypt(&NIST_KEY, &[0u8; 17]),
                Err(Error::InvalidLength {
                    context: "ciphertext",
                    expected: 16,
                    actual: 17,
                })
            );

            let mut out = [0u8; 32];
            // Fractional blocks are a contract violation, not a truncation.
            assert_eq!(
                cipher.encrypt_buffer(&NIST_KEY, &[0u8; 24], &mut out),
                Err(Error::InvalidLength {
                    context: "input buffer",
                    expected: 32,
                    actual: 24,
                })
            );
            assert_eq!(
                cipher.encrypt_buffer(&NIST_KEY, &[0u8; 16], &mut out),
                Err(Error::InvalidLength {
                    context: "output buffer",
                    expected: 16,
                    actual: 32,
                })
            );
        }
    }

    #[test]
    fn selection_is_static_for_the_engine_lifetime() {
        let cipher = MeshCipher::select(Some(SimulatedCipher::new()));
        assert_eq!(cipher.backend_name(), "hardware");
        let cipher = MeshCipher::select(None::<SimulatedCipher>);
        assert_eq!(cipher.backend_name(), "software");
    }

    #[test]
    fn timeout_surfaces_with_the_configured_budget() {
        use mesh_aes_hw::WaitBudget;

        let backend = HardwareBackend::with_wait_budget(SimulatedCipher::stuck(), WaitBudget::polls(64));
        let cipher = MeshCipher::with_backend(Box::new(backend));
        assert_eq!(
            cipher.encrypt(&NIST_KEY, &NIST_PLAIN),
            Err(Error::HardwareTimeout { polls: 64 })
        );
    }
}

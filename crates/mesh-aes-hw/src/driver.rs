//! Register-programming sequences for the cipher peripheral.

use mesh_aes_core::{Aes128Key, Block, BLOCK_LEN};

use crate::regs::{
    CipherRegisters, DmaDescriptor, DmaDirection, CTRL_DATA_FEED, CTRL_DECRYPT, CTRL_FINISHED,
};
use crate::Error;

/// Cipher direction for one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Produce ciphertext from plaintext.
    Encrypt,
    /// Produce plaintext from ciphertext.
    Decrypt,
}

/// Upper bound on status polls for one busy-wait.
///
/// A peripheral that stalls past the budget surfaces as
/// [`Error::Timeout`] instead of blocking the calling context forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitBudget {
    max_polls: u32,
}

impl WaitBudget {
    /// Builds a budget of exactly `max_polls` status reads.
    pub fn polls(max_polls: u32) -> Self {
        Self { max_polls }
    }
}

impl Default for WaitBudget {
    fn default() -> Self {
        // A completed block shows up within a handful of polls on real
        // silicon; this leaves three orders of magnitude of slack.
        Self { max_polls: 0x1_0000 }
    }
}

/// Drives one cipher peripheral through a [`CipherRegisters`] binding.
///
/// The engine itself carries no locking. It is wrapped in a
/// [`SharedEngine`](crate::SharedEngine) before being shared, because the
/// underlying peripheral is a singleton.
pub struct CipherEngine<R: CipherRegisters> {
    regs: R,
    budget: WaitBudget,
}

impl<R: CipherRegisters> CipherEngine<R> {
    /// Creates an engine with the default wait budget.
    pub fn new(regs: R) -> Self {
        Self::with_wait_budget(regs, WaitBudget::default())
    }

    /// Creates an engine with an explicit wait budget.
    pub fn with_wait_budget(regs: R, budget: WaitBudget) -> Self {
        Self { regs, budget }
    }

    /// Transforms a single block: direction, key bank, four data words in,
    /// bounded wait on the finished flag, four result words out.
    pub fn process_block(
        &mut self,
        op: Operation,
        key: &Aes128Key,
        block: &Block,
    ) -> Result<Block, Error> {
        log::trace!("hw cipher: single-block {op:?}");
        self.set_direction(op);
        self.load_key(key);

        // The peripheral holds the data-feed flag up until it has taken all
        // four input words.
        let mut words = block.chunks_exact(4);
        while self.regs.read_ctrl() & CTRL_DATA_FEED != 0 {
            match words.next() {
                Some(chunk) => {
                    let word = u32::from_le_bytes(chunk.try_into().expect("chunks are four bytes"));
                    self.regs.write_data(word);
                }
                None => break,
            }
        }

        self.wait_finished()?;

        let mut result = [0u8; BLOCK_LEN];
        for chunk in result.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.regs.read_data().to_le_bytes());
        }
        Ok(result)
    }

    /// Streams whole blocks through the DMA channels: destination and source
    /// descriptors, direction, key bank, channel enable, bounded wait on the
    /// finished flag, then an explicit drain of the destination.
    ///
    /// `data` and `result` must be equal-length whole multiples of 16 bytes;
    /// callers validate before reaching the driver.
    pub fn process_buffer(
        &mut self,
        op: Operation,
        key: &Aes128Key,
        data: &[u8],
        result: &mut [u8],
    ) -> Result<(), Error> {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        debug_assert_eq!(data.len(), result.len());
        log::trace!("hw cipher: dma {op:?} of {} blocks", data.len() / BLOCK_LEN);

        self.regs.configure_channel(DmaDescriptor {
            blocks: (result.len() / BLOCK_LEN) as u16,
            direction: DmaDirection::CipherToMemory,
        });
        self.regs.configure_channel(DmaDescriptor {
            blocks: (data.len() / BLOCK_LEN) as u16,
            direction: DmaDirection::MemoryToCipher,
        });

        self.set_direction(op);
        self.load_key(key);
        self.regs.enable_channels(data);

        self.wait_finished()?;
        self.regs.drain_destination(result);
        Ok(())
    }

    fn set_direction(&mut self, op: Operation) {
        let ctrl = self.regs.read_ctrl();
        match op {
            Operation::Encrypt => self.regs.write_ctrl(ctrl & !CTRL_DECRYPT),
            Operation::Decrypt => self.regs.write_ctrl(ctrl | CTRL_DECRYPT),
        }
    }

    fn load_key(&mut self, key: &Aes128Key) {
        for (index, byte) in key.as_bytes().iter().enumerate() {
            self.regs.write_key_byte(index, *byte);
        }
    }

    fn wait_finished(&mut self) -> Result<(), Error> {
        for _ in 0..self.budget.max_polls {
            if self.regs.read_ctrl() & CTRL_FINISHED != 0 {
                return Ok(());
            }
        }
        log::warn!(
            "hw cipher: finished flag not seen after {} polls",
            self.budget.max_polls
        );
        Err(Error::Timeout {
            polls: self.budget.max_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedCipher;
    use mesh_aes_core::{decrypt_block, encrypt_block, expand_key};
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

    #[test]
    fn single_block_matches_fips197_vector() {
        let mut engine = CipherEngine::new(SimulatedCipher::new());
        let key = Aes128Key::from(NIST_KEY);
        let ct = engine
            .process_block(Operation::Encrypt, &key, &NIST_PLAIN)
            .unwrap();
        assert_eq!(ct, NIST_CIPHER);
        let pt = engine
            .process_block(Operation::Decrypt, &key, &NIST_CIPHER)
            .unwrap();
        assert_eq!(pt, NIST_PLAIN);
    }

    #[test]
    fn single_block_matches_software_core_random() {
        let mut engine = CipherEngine::new(SimulatedCipher::new());
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let mut key_bytes = [0u8; 16];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key_bytes);
            rng.fill_bytes(&mut block);
            let key = Aes128Key::from(key_bytes);
            let schedule = expand_key(&key);

            let hw_ct = engine.process_block(Operation::Encrypt, &key, &block).unwrap();
            assert_eq!(hw_ct, encrypt_block(&block, &schedule));
            let hw_pt = engine.process_block(Operation::Decrypt, &key, &hw_ct).unwrap();
            assert_eq!(hw_pt, decrypt_block(&hw_ct, &schedule));
            assert_eq!(hw_pt, block);
        }
    }

    #[test]
    fn wait_is_bounded_by_the_budget() {
        // The simulator raises the finished flag after six status polls;
        // a budget of six is exactly enough on the single-block path.
        let key = Aes128Key::from(NIST_KEY);
        let mut engine =
            CipherEngine::with_wait_budget(SimulatedCipher::with_latency(6), WaitBudget::polls(6));
        assert!(engine.process_block(Operation::Encrypt, &key, &NIST_PLAIN).is_ok());

        let mut engine =
            CipherEngine::with_wait_budget(SimulatedCipher::with_latency(6), WaitBudget::polls(5));
        assert_eq!(
            engine.process_block(Operation::Encrypt, &key, &NIST_PLAIN),
            Err(Error::Timeout { polls: 5 })
        );
    }

    #[test]
    fn stalled_peripheral_times_out_instead_of_hanging() {
        let key = Aes128Key::from(NIST_KEY);
        let mut engine =
            CipherEngine::with_wait_budget(SimulatedCipher::stuck(), WaitBudget::polls(128));
        assert_eq!(
            engine.process_block(Operation::Encrypt, &key, &NIST_PLAIN),
            Err(Error::Timeout { polls: 128 })
        );
        assert_eq!(
            engine.process_buffer(Operation::Encrypt, &key, &[0u8; 32], &mut [0u8; 32]),
            Err(Error::Timeout { polls: 128 })
        );
    }

    #[test]
    fn dma_path_matches_single_block_path() {
        let mut rng = rand::thread_rng();
        for blocks in [1usize, 2, 16] {
            let mut key_bytes = [0u8; 16];
            rng.fill_bytes(&mut key_bytes);
            let key = Aes128Key::from(key_bytes);
            let mut data = vec![0u8; blocks * BLOCK_LEN];
            rng.fill_bytes(&mut data);

            let mut engine = CipherEngine::new(SimulatedCipher::new());
            let mut streamed = vec![0u8; data.len()];
            engine
                .process_buffer(Operation::Encrypt, &key, &data, &mut streamed)
                .unwrap();

            let mut one_at_a_time = Vec::with_capacity(data.len());
            for chunk in data.chunks_exact(BLOCK_LEN) {
                let block: Block = chunk.try_into().expect("chunks are one block");
                one_at_a_time
                    .extend_from_slice(&engine.process_block(Operation::Encrypt, &key, &block).unwrap());
            }
            assert_eq!(streamed, one_at_a_time);
        }
    }

    #[test]
    fn dma_round_trip() {
        let mut rng = rand::thread_rng();
        let mut key_bytes = [0u8; 16];
        rng.fill_bytes(&mut key_bytes);
        let key = Aes128Key::from(key_bytes);
        let mut data = vec![0u8; 8 * BLOCK_LEN];
        rng.fill_bytes(&mut data);

        let mut engine = CipherEngine::new(SimulatedCipher::new());
        let mut ciphertext = vec![0u8; data.len()];
        engine
            .process_buffer(Operation::Encrypt, &key, &data, &mut ciphertext)
            .unwrap();
        assert_ne!(ciphertext, data);

        let mut recovered = vec![0u8; data.len()];
        engine
            .process_buffer(Operation::Decrypt, &key, &ciphertext, &mut recovered)
            .unwrap();
        assert_eq!(recovered, data);
    }
}

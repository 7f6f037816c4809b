//! AES-128 keys and the expanded round-key schedule.

use crate::state::{Block, BLOCK_LEN};
use crate::tables::{sub, RCON};

/// Number of round keys an AES-128 schedule holds.
const ROUND_KEYS: usize = 11;

/// A 128-bit cipher key.
///
/// The key is never retained by the engine; its lifetime is the single
/// operation it is supplied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aes128Key([u8; BLOCK_LEN]);

impl Aes128Key {
    /// Returns the raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }
}

impl From<[u8; BLOCK_LEN]> for Aes128Key {
    fn from(value: [u8; BLOCK_LEN]) -> Self {
        Self(value)
    }
}

/// The eleven expanded round keys.
///
/// Expansion is a pure function of the key: the same key always yields the
/// same schedule. The forward cipher enters through [`RoundKeys::initial`]
/// and the inverse cipher walks the schedule backwards starting from
/// [`RoundKeys::last`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKeys([Block; ROUND_KEYS]);

impl RoundKeys {
    /// Returns the round key for the given round (0..=10).
    #[inline]
    pub fn round(&self, index: usize) -> &Block {
        &self.0[index]
    }

    /// The initial round key, identical to the raw cipher key.
    #[inline]
    pub fn initial(&self) -> &Block {
        &self.0[0]
    }

    /// The final round key, the entry point of the inverse cipher.
    #[inline]
    pub fn last(&self) -> &Block {
        &self.0[ROUND_KEYS - 1]
    }
}

/// Expands a 128-bit key into the full round-key schedule.
///
/// Each 4-byte word combines the previous word with the word four positions
/// back; every fourth word is first rotated, substituted through the S-box,
/// and folded with a round constant.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut words = [[0u8; 4]; 4 * ROUND_KEYS];
    for (word, chunk) in words.iter_mut().zip(key.0.chunks_exact(4)) {
        word.copy_from_slice(chunk);
    }

    for i in 4..4 * ROUND_KEYS {
        let mut temp = words[i - 1];
        if i % 4 == 0 {
            temp.rotate_left(1);
            for byte in temp.iter_mut() {
                *byte = sub(*byte);
            }
            temp[0] ^= RCON[i / 4 - 1];
        }
        for (t, prev) in temp.iter_mut().zip(words[i - 4].iter()) {
            *t ^= *prev;
        }
        words[i] = temp;
    }

    let mut keys = [[0u8; BLOCK_LEN]; ROUND_KEYS];
    for (round, round_key) in keys.iter_mut().enumerate() {
        for word in 0..4 {
            round_key[4 * word..4 * word + 4].copy_from_slice(&words[4 * round + word]);
        }
    }
    RoundKeys(keys)
}

//! Forward and inverse cipher over a single block.

use crate::rounds::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::schedule::RoundKeys;
use crate::state::Block;

/// Encrypts one block with a pre-expanded schedule.
///
/// The forward cipher starts from the initial round key, runs nine full
/// rounds and a final round that omits MixColumns.
pub fn encrypt_block(block: &Block, schedule: &RoundKeys) -> Block {
    let mut state = *block;

    add_round_key(&mut state, schedule.initial());

    for round in 1..10 {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, schedule.round(round));
    }

    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, schedule.last());

    state
}

/// Decrypts one block with a pre-expanded schedule.
///
/// The inverse cipher enters through the final round key and walks the
/// schedule backwards, mirroring the forward round order.
pub fn decrypt_block(block: &Block, schedule: &RoundKeys) -> Block {
    let mut state = *block;

    add_round_key(&mut state, schedule.last());
    for round in (1..10).rev() {
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        add_round_key(&mut state, schedule.round(round));
        inv_mix_columns(&mut state);
    }
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);
    add_round_key(&mut state, schedule.initial());

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{expand_key, Aes128Key};
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
    fn encrypt_matches_fips197_vector() {
        let schedule = expand_key(&Aes128Key::from(NIST_KEY));
        assert_eq!(encrypt_block(&NIST_PLAIN, &schedule), NIST_CIPHER);
    }

    #[test]
    fn decrypt_matches_fips197_vector() {
        let schedule = expand_key(&Aes128Key::from(NIST_KEY));
        assert_eq!(decrypt_block(&NIST_CIPHER, &schedule), NIST_PLAIN);
    }

    #[test]
    fn encrypt_decrypt_round_trip_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut key_bytes = [0u8; 16];
            let mut block = [0u8; 16];
            rng.fill_bytes(&mut key_bytes);
            rng.fill_bytes(&mut block);
            let schedule = expand_key(&Aes128Key::from(key_bytes));
            let ct = encrypt_block(&block, &schedule);
            assert_eq!(decrypt_block(&ct, &schedule), block);
        }
    }
}

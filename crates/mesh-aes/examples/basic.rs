//! Demonstrates that the two backends are observably identical.

use mesh_aes::MeshCipher;
use mesh_aes_hw::SimulatedCipher;

fn main() {
    let software = MeshCipher::software();
    let hardware = MeshCipher::hardware(SimulatedCipher::new());

    let key = *b"sixteen byte key";
    let message = *b"first block here second blockher";

    let mut from_hardware = [0u8; 32];
    hardware
        .encrypt_buffer(&key, &message, &mut from_hardware)
        .expect("hardware bulk encryption");

    let mut from_software = [0u8; 32];
    software
        .encrypt_buffer(&key, &message, &mut from_software)
        .expect("software bulk encryption");

    assert_eq!(from_hardware, from_software);

    let mut recovered = [0u8; 32];
    software
        .decrypt_buffer(&key, &from_hardware, &mut recovered)
        .expect("software bulk decryption");
    assert_eq!(recovered, message);

    println!("example succeeded; hardware ciphertext matches the software core");
}

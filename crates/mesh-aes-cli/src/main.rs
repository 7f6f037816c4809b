//! Command-line interface for the mesh AES engine.

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mesh_aes::{MeshCipher, BLOCK_LEN};
use mesh_aes_hw::SimulatedCipher;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Mesh AES engine CLI.
#[derive(Parser)]
#[command(
    name = "meshaes",
    version,
    author,
    about = "AES-128 engine CLI (software and hardware cipher backends)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which cipher backend to drive.
#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Portable software core.
    Soft,
    /// Hardware engine (simulated register model on hosted targets).
    Hw,
}

impl Backend {
    fn build(self) -> MeshCipher {
        match self {
            Backend::Soft => MeshCipher::software(),
            Backend::Hw => MeshCipher::hardware(SimulatedCipher::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt 16-byte blocks from a file.
    Enc {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Input file (must be a multiple of 16 bytes).
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output ciphertext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Backend to use.
        #[arg(long, value_enum, default_value = "soft")]
        backend: Backend,
    },
    /// Decrypt 16-byte blocks from a file.
    Dec {
        /// AES-128 key as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// Input file (ciphertext, a multiple of 16 bytes).
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output plaintext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Backend to use.
        #[arg(long, value_enum, default_value = "soft")]
        backend: Backend,
    },
    /// Verify the two backends agree for random samples.
    Check {
        /// Number of random samples to test.
        #[arg(long, default_value_t = 64)]
        samples: usize,
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a local demo: random key, encrypt on both backends, decrypt back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Enc {
            key_hex,
            input,
            output,
            backend,
        } => cmd_transform(&key_hex, &input, &output, backend, Direction::Encrypt),
        Commands::Dec {
            key_hex,
            input,
            output,
            backend,
        } => cmd_transform(&key_hex, &input, &output, backend, Direction::Decrypt),
        Commands::Check { samples, seed } => cmd_check(samples, seed),
        Commands::Demo { seed } => cmd_demo(seed),
    }
}

enum Direction {
    Encrypt,
    Decrypt,
}

fn cmd_transform(
    key_hex: &str,
    input_path: &PathBuf,
    output_path: &PathBuf,
    backend: Backend,
    direction: Direction,
) -> Result<()> {
    let key = parse_key_hex(key_hex)?;
    let cipher = backend.build();
    let data = fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    if data.is_empty() || data.len() % BLOCK_LEN != 0 {
        bail!("input length must be a nonzero multiple of 16 bytes");
    }

    let mut result = vec![0u8; data.len()];
    match direction {
        Direction::Encrypt => cipher
            .encrypt_buffer(&key, &data, &mut result)
            .context("encrypt buffer")?,
        Direction::Decrypt => cipher
            .decrypt_buffer(&key, &data, &mut result)
            .context("decrypt buffer")?,
    }
    fs::write(output_path, result).with_context(|| format!("write {}", output_path.display()))?;
    Ok(())
}

fn cmd_check(samples: usize, seed: Option<u64>) -> Result<()> {
    let software = MeshCipher::software();
    let hardware = MeshCipher::hardware(SimulatedCipher::new());
    let mut rng = seeded_rng(seed);

    for _ in 0..samples {
        let mut key = [0u8; 16];
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut block);

        let soft_ct = software.encrypt(&key, &block).context("software encrypt")?;
        let hard_ct = hardware.encrypt(&key, &block).context("hardware encrypt")?;
        if soft_ct != hard_ct {
            bail!("mismatch between software and hardware ciphertexts");
        }
        let soft_pt = software.decrypt(&key, &soft_ct).context("software decrypt")?;
        let hard_pt = hardware.decrypt(&key, &hard_ct).context("hardware decrypt")?;
        if soft_pt != hard_pt || soft_pt != block {
            bail!("mismatch between software and hardware plaintexts");
        }
    }
    println!("{samples} samples checked; backends agree");
    Ok(())
}

fn cmd_demo(seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key = [0u8; 16];
    rng.fill_bytes(&mut key);
    let mut block = [0u8; 16];
    rng.fill_bytes(&mut block);

    let software = MeshCipher::software();
    let hardware = MeshCipher::hardware(SimulatedCipher::new());

    let soft_ct = software.encrypt(&key, &block).context("software encrypt")?;
    let hard_ct = hardware.encrypt(&key, &block).context("hardware encrypt")?;
    let recovered = software.decrypt(&key, &hard_ct).context("software decrypt")?;

    println!("demo key:        {}", hex::encode(key));
    println!("plaintext:       {}", hex::encode(block));
    println!("sw ciphertext:   {}", hex::encode(soft_ct));
    println!("hw ciphertext:   {}", hex::encode(hard_ct));
    println!("decrypted:       {}", hex::encode(recovered));
    if soft_ct != hard_ct {
        bail!("demo backends disagree");
    }
    if recovered != block {
        bail!("demo roundtrip failed");
    }
    Ok(())
}

fn parse_key_hex(hex_str: &str) -> Result<[u8; 16]> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    if bytes.len() != 16 {
        bail!("AES-128 key must be 16 bytes (32 hex characters)");
    }
    let mut key = [0u8; 16];
    key.copy_from_slice(&bytes);
    Ok(key)
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}

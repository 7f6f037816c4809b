//! Simulated cipher peripheral.
//!
//! Implements the [`CipherRegisters`] contract over the software core so
//! that the driver's register sequences can run, and be observed, without
//! silicon. The simulator models the peripheral's visible behavior: the
//! data-feed flag held up until four input words arrive, a completion
//! latency measured in status polls, and a finished flag that gates result
//! reads. Instrumentation counters expose polls, completed operations and
//! overlapping operation windows for the serialization tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use mesh_aes_core::{decrypt_block, encrypt_block, expand_key, Aes128Key, Block, BLOCK_LEN};

use crate::regs::{
    CipherRegisters, DmaDescriptor, DmaDirection, CTRL_DATA_FEED, CTRL_DECRYPT, CTRL_FINISHED,
};

/// Default number of status polls before a result becomes visible.
const DEFAULT_LATENCY: u32 = 4;

#[derive(Debug, Default)]
struct StatsInner {
    polls: AtomicU32,
    operations: AtomicU32,
    overlaps: AtomicU32,
}

/// Shared instrumentation handle for a [`SimulatedCipher`].
///
/// Cloned out of the simulator before it is moved into an engine, so tests
/// can inspect counters while the simulator is owned elsewhere.
#[derive(Clone, Debug, Default)]
pub struct SimStats {
    inner: Arc<StatsInner>,
}

impl SimStats {
    /// Total control-register reads.
    pub fn polls(&self) -> u32 {
        self.inner.polls.load(Ordering::Relaxed)
    }

    /// Completed operations (single blocks and DMA transfers alike).
    pub fn operations(&self) -> u32 {
        self.inner.operations.load(Ordering::Relaxed)
    }

    /// Operation windows opened while another was still in flight. Any
    /// nonzero value means two callers interleaved register programming.
    pub fn overlaps(&self) -> u32 {
        self.inner.overlaps.load(Ordering::Relaxed)
    }
}

/// Register-level model of the cipher peripheral.
pub struct SimulatedCipher {
    ctrl: u8,
    key: [u8; BLOCK_LEN],
    inbox: Vec<u8>,
    outbox: Vec<u8>,
    read_pos: usize,
    /// Status polls remaining before the finished flag becomes visible.
    pending: Option<u32>,
    latency: u32,
    stuck: bool,
    source_channel: Option<DmaDescriptor>,
    dest_channel: Option<DmaDescriptor>,
    dma_out: Vec<u8>,
    in_flight: bool,
    stats: SimStats,
}

impl SimulatedCipher {
    /// Simulator with the default completion latency.
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    /// Simulator whose finished flag becomes visible after `polls` status
    /// reads.
    pub fn with_latency(polls: u32) -> Self {
        Self {
            ctrl: 0,
            key: [0u8; BLOCK_LEN],
            inbox: Vec::new(),
            outbox: Vec::new(),
            read_pos: 0,
            pending: None,
            latency: polls,
            stuck: false,
            source_channel: None,
            dest_channel: None,
            dma_out: Vec::new(),
            in_flight: false,
            stats: SimStats::default(),
        }
    }

    /// Simulator that never asserts the finished flag, for timeout tests.
    pub fn stuck() -> Self {
        let mut sim = Self::new();
        sim.stuck = true;
        sim
    }

    /// Clones the instrumentation handle.
    pub fn stats(&self) -> SimStats {
        self.stats.clone()
    }

    fn transform(&self, block: &Block) -> Block {
        let schedule = expand_key(&Aes128Key::from(self.key));
        if self.ctrl & CTRL_DECRYPT != 0 {
            decrypt_block(block, &schedule)
        } else {
            encrypt_block(block, &schedule)
        }
    }

    fn finish_operation(&mut self) {
        self.in_flight = false;
        self.ctrl &= !CTRL_FINISHED;
        self.stats.inner.operations.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for SimulatedCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherRegisters for SimulatedCipher {
    fn read_ctrl(&mut self) -> u8 {
        self.stats.inner.polls.fetch_add(1, Ordering::Relaxed);
        if let Some(remaining) = self.pending {
            if !self.stuck {
                if remaining == 0 {
                    self.ctrl |= CTRL_FINISHED;
                    self.pending = None;
                } else {
                    self.pending = Some(remaining - 1);
                }
            }
        }
        self.ctrl
    }

    fn write_ctrl(&mut self, bits: u8) {
        // A direction write opens a new operation window.
        if self.in_flight {
            self.stats.inner.overlaps.fetch_add(1, Ordering::Relaxed);
        }
        self.in_flight = true;
        self.ctrl = (bits & CTRL_DECRYPT) | CTRL_DATA_FEED;
        self.inbox.clear();
        self.outbox.clear();
        self.read_pos = 0;
        self.pending = None;
    }

    fn write_key_byte(&mut self, index: usize, value: u8) {
        self.key[index] = value;
    }

    fn write_data(&mut self, word: u32) {
        self.inbox.extend_from_slice(&word.to_le_bytes());
        if self.inbox.len() == BLOCK_LEN {
            let block: Block = self.inbox[..].try_into().expect("inbox holds one block");
            self.outbox = self.transform(&block).to_vec();
            self.ctrl &= !CTRL_DATA_FEED;
            self.pending = Some(self.latency);
        }
    }

    fn read_data(&mut self) -> u32 {
        let chunk = &self.outbox[self.read_pos..self.read_pos + 4];
        let word = u32::from_le_bytes(chunk.try_into().expect("outbox chunks are four bytes"));
        self.read_pos += 4;
        if self.read_pos >= self.outbox.len() {
            self.finish_operation();
        }
        word
    }

    fn configure_channel(&mut self, descriptor: DmaDescriptor) {
        match descriptor.direction {
            DmaDirection::MemoryToCipher => self.source_channel = Some(descriptor),
            DmaDirection::CipherToMemory => self.dest_channel = Some(descriptor),
        }
    }

    fn enable_channels(&mut self, source: &[u8]) {
        let blocks = self
            .source_channel
            .map(|channel| channel.blocks as usize)
            .unwrap_or(0);
        self.ctrl &= !CTRL_DATA_FEED;
        self.dma_out.clear();
        for chunk in source[..blocks * BLOCK_LEN].chunks_exact(BLOCK_LEN) {
            let block: Block = chunk.try_into().expect("chunks are one block");
            self.dma_out.extend_from_slice(&self.transform(&block));
        }
        self.pending = Some(self.latency);
    }

    fn drain_destination(&mut self, destination: &mut [u8]) {
        let blocks = self
            .dest_channel
            .map(|channel| channel.blocks as usize)
            .unwrap_or(0);
        let len = (blocks * BLOCK_LEN).min(destination.len()).min(self.dma_out.len());
        destination[..len].copy_from_slice(&self.dma_out[..len]);
        self.dma_out.clear();
        self.finish_operation();
    }
}

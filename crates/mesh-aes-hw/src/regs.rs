//! Register-file contract of the cipher peripheral.

/// Control-register bit: direction. Clear for encryption, set for decryption.
pub const CTRL_DECRYPT: u8 = 1 << 0;
/// Control-register bit: the peripheral is ready to accept the next input
/// word through the data port.
pub const CTRL_DATA_FEED: u8 = 1 << 1;
/// Control-register bit: the operation finished and the result is readable.
/// Result words must not be read before this flag is observed.
pub const CTRL_FINISHED: u8 = 1 << 2;

/// Which way a DMA channel moves data relative to the cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaDirection {
    /// The source channel: reads input blocks out of memory into the cipher.
    MemoryToCipher,
    /// The destination channel: writes finished blocks back to memory.
    CipherToMemory,
}

/// Programming for one DMA channel: a transfer length in whole 16-byte
/// blocks and the channel direction. Fractional blocks are unrepresentable;
/// lengths are validated before a descriptor is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DmaDescriptor {
    /// Transfer length in 16-byte blocks.
    pub blocks: u16,
    /// Channel direction.
    pub direction: DmaDirection,
}

/// Read/write contract of the peripheral's register file.
///
/// [`CipherEngine`](crate::CipherEngine) drives any implementation of this
/// trait through the same sequences it would use on silicon. Tests and
/// hardware-less targets substitute [`SimulatedCipher`](crate::SimulatedCipher);
/// a production BSP implements it with volatile MMIO accesses.
pub trait CipherRegisters {
    /// Reads the control register.
    fn read_ctrl(&mut self) -> u8;

    /// Writes the control register.
    fn write_ctrl(&mut self, bits: u8);

    /// Writes one byte of the 16-entry key register bank.
    fn write_key_byte(&mut self, index: usize, value: u8);

    /// Feeds one 32-bit word through the data port.
    fn write_data(&mut self, word: u32);

    /// Reads one 32-bit result word from the data port. Only valid once
    /// [`CTRL_FINISHED`] has been observed.
    fn read_data(&mut self) -> u32;

    /// Programs one DMA channel.
    fn configure_channel(&mut self, descriptor: DmaDescriptor);

    /// Enables both DMA channels, handing the source channel its memory.
    /// The transfer runs until the control register reports
    /// [`CTRL_FINISHED`].
    fn enable_channels(&mut self, source: &[u8]);

    /// Drains the destination channel's completed blocks into `destination`.
    /// Only valid once [`CTRL_FINISHED`] has been observed.
    fn drain_destination(&mut self, destination: &mut [u8]);
}

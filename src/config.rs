//! Build-time serial configuration.

/// Baud rate a freshly probed UART is programmed with.
pub const SERIAL_BAUD_RATE: u32 = 115_200;

/// Input clock of a stock 16550 (1.8432 MHz).
pub const SERIAL_CLOCK_HZ: u32 = 1_843_200;

/// Ticks to wait after touching the FIFO control register.
pub const FIFO_SETTLE_TICKS: u64 = 100;

/// Capacity of a device description string.
pub const DESCR_CAPACITY: usize = 80;

/// Per-instance settings handed to the probe routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub baud_rate: u32,
    pub clock_hz: u32,
    /// Registers are `1 << reg_shift` bytes apart, at most
    /// [`MAX_REG_SHIFT`](crate::drivers::ns16550::MAX_REG_SHIFT).
    pub reg_shift: u32,
}

impl UartConfig {
    pub const fn new() -> Self {
        Self {
            baud_rate: SERIAL_BAUD_RATE,
            clock_hz: SERIAL_CLOCK_HZ,
            reg_shift: 0,
        }
    }

    pub const fn with_reg_shift(self, reg_shift: u32) -> Self {
        Self { reg_shift, ..self }
    }

    pub const fn with_clock(self, clock_hz: u32) -> Self {
        Self { clock_hz, ..self }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new()
    }
}

/*
https://www.lammertbies.nl/comm/info/serial-uart

            R                       W
base     RBR receiver buffer   THR transmitter holding | DLL divisor latch LSB  DLL divisor latch LSB
base+1   IER interrupt enable  IER interrupt enable    | DLM divisor latch MSB  DLM divisor latch MSB
base+2   IIR interrupt ident   FCR FIFO control        | IIR interrupt ident    FCR FIFO control
base+3   LCR line control      LCR line control        | LCR line control       LCR line control
base+4   MCR modem control     MCR modem control       | MCR modem control      MCR modem control
base+5   LSR line status       factory test            | LSR line status        factory test
base+6   MSR modem status      not used                | MSR modem status       not used
base+7   SCR scratch           SCR scratch             | SCR scratch            SCR scratch

Offsets are scaled by `1 << reg_shift` on parts that space their registers out.
*/

use core::fmt::Write as _;

use alloc::boxed::Box;
use bitflags::bitflags;

use crate::{
    config::{UartConfig, FIFO_SETTLE_TICKS},
    dev::{registry::DevDescr, DevClass, DevError, DevHandle, DevResult, Device, DeviceRegistry, DriverDesc},
    physio::{Mmio, PhysIo},
    timer::TickSource,
};

#[allow(clippy::upper_case_acronyms)]
#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    RBR = 0,
    IER = 1,
    IIR = 2,
    LCR = 3,
    MCR = 4,
    LSR = 5,
    MSR = 6,
    SCR = 7,
}

#[allow(clippy::upper_case_acronyms)]
#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    THR = 0,
    IER = 1,
    FCR = 2,
    LCR = 3,
    MCR = 4,
    SCR = 7,
    /// Divisor latch LSB, only while [`Lcr::DLAB`] is set
    DLL = 8,
    /// Divisor latch MSB, only while [`Lcr::DLAB`] is set
    DLM = 9,
}

impl Write {
    const fn offset(self) -> usize {
        match self {
            Write::DLL => 0,
            Write::DLM => 1,
            reg => reg as usize,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lcr: u8 {
        const WLEN0 = 1 << 0;
        const WLEN1 = 1 << 1;
        /// 8 data bits, no parity, 1 stop bit
        const WORD_8N1 = Self::WLEN0.bits() | Self::WLEN1.bits();
        const DLAB = 1 << 7;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mcr: u8 {
        const DTR = 1 << 0;
        const RTS = 1 << 1;
        const OUT1 = 1 << 2;
        /// Gates the interrupt line on most boards
        const OUT2 = 1 << 3;
        const LOOP = 1 << 4;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Fcr: u8 {
        const ENABLE = 1 << 0;
        const RX_RESET = 1 << 1;
        const TX_RESET = 1 << 2;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lsr: u8 {
        const DATA_READY = 1 << 0;
        const OVERRUN = 1 << 1;
        const PARITY = 1 << 2;
        const FRAMING = 1 << 3;
        const BREAK = 1 << 4;
        const THR_EMPTY = 1 << 5;
        const TX_IDLE = 1 << 6;
        const FIFO_ERROR = 1 << 7;
    }
}

/// Both bits read back as set only when the FIFO is really there.
pub const IIR_FIFO_MASK: u8 = 0xc0;

#[derive(strum::FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FlowControl {
    None = 0,
    Software = 1,
    Hardware = 2,
}

#[derive(strum::FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IoctlCmd {
    SetSpeed = 0,
    GetSpeed = 1,
    SetFlow = 2,
    GetFlow = 3,
}

pub static NS16550_UART: DriverDesc = DriverDesc {
    description: "NS16550 UART",
    bootname: "uart",
    class: DevClass::Serial,
};

/// Widest register stride supported, 128 bytes apart.
pub const MAX_REG_SHIFT: u32 = 7;

/// Register window of one UART. The base address is fixed at construction.
pub struct UartRegs<B> {
    bus: B,
    base: usize,
    shift: u32,
}

impl<B> UartRegs<B> {
    pub fn new(bus: B, base: usize, shift: u32) -> Self {
        assert!(shift <= MAX_REG_SHIFT, "register shift {shift} out of range");
        Self { bus, base, shift }
    }

    pub fn base(&self) -> usize {
        self.base
    }
}

impl<B: PhysIo> UartRegs<B> {

    #[inline(always)]
    pub fn read(&mut self, reg: Read) -> u8 {
        self.bus.read8(self.base + ((reg as usize) << self.shift))
    }

    #[inline(always)]
    pub fn write(&mut self, reg: Write, v: u8) {
        self.bus.write8(self.base + (reg.offset() << self.shift), v)
    }

    fn lsr(&mut self) -> Lsr {
        Lsr::from_bits_retain(self.read(Read::LSR))
    }
}

/// Baud rate divisor for the latch, clamped into what the latch can hold.
pub fn divisor(clock_hz: u32, baud_rate: u32) -> u16 {
    (clock_hz / 16 / baud_rate.max(1)).clamp(1, u16::MAX as u32) as u16
}

/// A polled NS16550 compatible UART.
pub struct Ns16550<B, T> {
    regs: UartRegs<B>,
    ticks: T,
    clock_hz: u32,
    /// Rate the divisor latch is programmed with on open
    line_rate: u32,
    /// Reported through the speed ioctls only
    baud_rate: u32,
    /// Raw flow control word, see [`FlowControl`] for the known values
    flow: u32,
}

impl<B: PhysIo, T: TickSource> Ns16550<B, T> {
    pub fn new(bus: B, ticks: T, base: usize, config: UartConfig) -> Self {
        Self {
            regs: UartRegs::new(bus, base, config.reg_shift),
            ticks,
            clock_hz: config.clock_hz,
            line_rate: config.baud_rate,
            baud_rate: config.baud_rate,
            flow: FlowControl::None as u32,
        }
    }

    pub fn base(&self) -> usize {
        self.regs.base()
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn flow_control(&self) -> Option<FlowControl> {
        FlowControl::from_repr(self.flow)
    }

    // TODO: program MCR/AFE once a board needs hardware flow control
    fn setflow(&mut self) {}
}

impl<B: PhysIo, T: TickSource> Device for Ns16550<B, T> {
    fn open(&mut self) -> DevResult<()> {
        let div = divisor(self.clock_hz, self.line_rate);
        log::debug!(
            "ns16550 {:#x}: {} baud, divisor {div}",
            self.regs.base(),
            self.line_rate
        );

        let [lo, hi] = div.to_le_bytes();
        self.regs.write(Write::LCR, Lcr::DLAB.bits());
        self.regs.write(Write::DLL, lo);
        self.regs.write(Write::DLM, hi);
        self.regs.write(Write::LCR, Lcr::WORD_8N1.bits());
        self.regs
            .write(Write::MCR, (Mcr::DTR | Mcr::RTS | Mcr::OUT2).bits());
        self.regs.write(Write::IER, 0); // polled only

        self.regs.write(Write::FCR, Fcr::ENABLE.bits());
        self.ticks.sleep_ticks(FIFO_SETTLE_TICKS);
        // trigger level 1 is all zeroes
        self.regs.write(
            Write::FCR,
            (Fcr::ENABLE | Fcr::RX_RESET | Fcr::TX_RESET).bits(),
        );
        self.ticks.sleep_ticks(FIFO_SETTLE_TICKS);

        if self.regs.read(Read::IIR) & IIR_FIFO_MASK != IIR_FIFO_MASK {
            log::warn!("ns16550 {:#x}: no working FIFO, disabling", self.regs.base());
            self.regs.write(Write::FCR, 0);
        }

        self.setflow();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> DevResult<usize> {
        let mut len = 0;
        while len < buf.len() && self.regs.lsr().contains(Lsr::DATA_READY) {
            buf[len] = self.regs.read(Read::RBR);
            len += 1;
        }

        Ok(len)
    }

    fn inpstat(&mut self) -> DevResult<bool> {
        Ok(self.regs.lsr().contains(Lsr::DATA_READY))
    }

    fn write(&mut self, buf: &[u8]) -> DevResult<usize> {
        let mut len = 0;
        while len < buf.len() && self.regs.lsr().contains(Lsr::THR_EMPTY) {
            self.regs.write(Write::THR, buf[len]);
            len += 1;
        }

        Ok(len)
    }

    fn ioctl(&mut self, cmd: u32, param: &mut u32) -> DevResult<()> {
        match IoctlCmd::from_repr(cmd).ok_or(DevError::InvalidCommand)? {
            IoctlCmd::GetSpeed => *param = self.baud_rate,
            IoctlCmd::SetSpeed => {
                // stored only, the line keeps running at the configured rate
                log::trace!("ns16550 {:#x}: speed set to {param}", self.regs.base());
                self.baud_rate = *param;
            }
            IoctlCmd::GetFlow => *param = self.flow,
            IoctlCmd::SetFlow => {
                self.flow = *param;
                log::trace!("ns16550 {:#x}: flow control {}", self.regs.base(), self.flow);
                self.setflow();
            }
        }

        Ok(())
    }

    fn close(&mut self) -> DevResult<()> {
        self.regs.write(Write::MCR, 0);
        Ok(())
    }
}

/// Creates the instance for a UART found at `base` and attaches it to `registry`.
pub fn probe<B, T>(
    registry: &mut DeviceRegistry,
    bus: B,
    ticks: T,
    base: usize,
    config: UartConfig,
) -> DevResult<DevHandle>
where
    B: PhysIo + 'static,
    T: TickSource + 'static,
{
    let mut descr = DevDescr::new();
    write!(descr, "{} at {base:#X}", NS16550_UART.description)
        .map_err(|_| DevError::InvalidArgument)?;

    let uart = Ns16550::new(bus, ticks, base, config);
    registry.attach(&NS16550_UART, Box::new(uart), &descr)
}

/// [`probe`] for a UART mapped into the physical address space.
///
/// # Safety
/// `base` must be a valid memory-mapped Ns16550 compliant UART controller, with every
/// register reachable at the spacing given by `config.reg_shift`.
pub unsafe fn probe_mmio<T: TickSource + 'static>(
    registry: &mut DeviceRegistry,
    ticks: T,
    base: usize,
    config: UartConfig,
) -> DevResult<DevHandle> {
    let bus = unsafe { Mmio::new() };
    probe(registry, bus, ticks, base, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_for_common_rates() {
        assert_eq!(divisor(1_843_200, 115_200), 1);
        assert_eq!(divisor(1_843_200, 9600), 12);
        assert_eq!(divisor(1_843_200, 50), 2304);
        assert_eq!(divisor(1_843_200, 0), u16::MAX);
        assert_eq!(divisor(1_843_200, 1_000_000), 1);
    }

    #[test]
    fn latch_aliases_data_and_ier() {
        assert_eq!(Write::DLL.offset(), Write::THR.offset());
        assert_eq!(Write::DLM.offset(), Write::IER.offset());
        assert_eq!(Write::FCR.offset(), Read::IIR as usize);
        assert_eq!(Write::SCR.offset(), 7);
    }

    #[test]
    fn flag_encodings() {
        assert_eq!(Lcr::WORD_8N1.bits(), 0x03);
        assert_eq!((Mcr::DTR | Mcr::RTS | Mcr::OUT2).bits(), 0x0b);
        assert_eq!((Fcr::ENABLE | Fcr::RX_RESET | Fcr::TX_RESET).bits(), 0x07);
        assert_eq!(IoctlCmd::from_repr(3), Some(IoctlCmd::GetFlow));
        assert_eq!(FlowControl::from_repr(3), None);
    }

    #[test]
    fn widest_stride_accepted() {
        let regs = UartRegs::new((), 0, MAX_REG_SHIFT);
        assert_eq!(regs.base(), 0);
    }

    #[test]
    #[should_panic(expected = "register shift")]
    fn oversized_stride_rejected() {
        UartRegs::new((), 0, usize::BITS);
    }
}

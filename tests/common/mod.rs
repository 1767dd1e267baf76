#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use ns16550::{physio::PhysIo, timer::TickSource};

const DLAB: u8 = 0x80;

#[derive(Default)]
pub struct SimState {
    pub base: usize,
    pub shift: u32,
    pub fifo_capable: bool,
    pub lcr: u8,
    pub mcr: u8,
    pub ier: u8,
    pub fcr: u8,
    pub dll: u8,
    pub dlm: u8,
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    /// Bytes the transmitter accepts before reporting busy, `None` for always ready
    pub tx_slots: Option<usize>,
    /// Every register write as `(offset, value)`
    pub writes: Vec<(usize, u8)>,
    pub lsr_reads: usize,
}

/// A behavioral model of an NS16550 sitting on a bus.
#[derive(Clone)]
pub struct SimUart(pub Rc<RefCell<SimState>>);

impl SimUart {
    pub fn new(base: usize) -> Self {
        Self(Rc::new(RefCell::new(SimState {
            base,
            fifo_capable: true,
            ..Default::default()
        })))
    }

    pub fn without_fifo(self) -> Self {
        self.0.borrow_mut().fifo_capable = false;
        self
    }

    pub fn with_shift(self, shift: u32) -> Self {
        self.0.borrow_mut().shift = shift;
        self
    }

    pub fn with_tx_slots(self, slots: usize) -> Self {
        self.0.borrow_mut().tx_slots = Some(slots);
        self
    }

    pub fn push_rx(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn state(&self) -> std::cell::Ref<'_, SimState> {
        self.0.borrow()
    }

    pub fn clear_writes(&self) {
        self.0.borrow_mut().writes.clear();
    }

    fn offset(s: &SimState, addr: usize) -> usize {
        let rel = addr - s.base;
        assert_eq!(rel & ((1 << s.shift) - 1), 0, "unaligned register access at {addr:#x}");
        rel >> s.shift
    }
}

impl PhysIo for SimUart {
    fn read8(&mut self, addr: usize) -> u8 {
        let mut s = self.0.borrow_mut();
        match Self::offset(&s, addr) {
            0 if s.lcr & DLAB != 0 => s.dll,
            0 => s.rx.pop_front().unwrap_or(0),
            1 if s.lcr & DLAB != 0 => s.dlm,
            1 => s.ier,
            2 => {
                if s.fifo_capable && s.fcr & 1 != 0 {
                    0xc1
                } else {
                    0x01
                }
            }
            3 => s.lcr,
            4 => s.mcr,
            5 => {
                s.lsr_reads += 1;
                let mut lsr = 0;
                if !s.rx.is_empty() {
                    lsr |= 0x01;
                }
                if s.tx_slots.map_or(true, |n| n > 0) {
                    lsr |= 0x20;
                }
                lsr
            }
            _ => 0,
        }
    }

    fn write8(&mut self, addr: usize, v: u8) {
        let mut s = self.0.borrow_mut();
        let off = Self::offset(&s, addr);
        s.writes.push((off, v));
        match off {
            0 if s.lcr & DLAB != 0 => s.dll = v,
            0 => {
                s.tx.push(v);
                if let Some(n) = s.tx_slots.as_mut() {
                    *n = n.saturating_sub(1);
                }
            }
            1 if s.lcr & DLAB != 0 => s.dlm = v,
            1 => s.ier = v,
            2 => {
                s.fcr = v;
                if !s.fifo_capable {
                    s.fcr &= !1;
                }
            }
            3 => s.lcr = v,
            4 => s.mcr = v,
            _ => {}
        }
    }
}

/// Advances one tick every time it is sampled.
#[derive(Clone, Default)]
pub struct SimClock(pub Rc<Cell<u64>>);

impl SimClock {
    pub fn elapsed(&self) -> u64 {
        self.0.get()
    }
}

impl TickSource for SimClock {
    fn now(&self) -> u64 {
        let t = self.0.get();
        self.0.set(t + 1);
        t
    }
}

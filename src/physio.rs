/// Byte-wide access to a physical register space.
///
/// Accesses are not validated; a bus is only handed to a driver after the
/// address was probed.
pub trait PhysIo {
    fn read8(&mut self, addr: usize) -> u8;
    fn write8(&mut self, addr: usize, v: u8);
}

/// Identity-mapped memory bus.
pub struct Mmio {
    _priv: (),
}

impl Mmio {
    /// Creates a new [`Mmio`] bus.
    ///
    /// # Safety
    /// Every address later passed to [`PhysIo`] must be mapped and safe to access with
    /// volatile byte loads and stores.
    pub const unsafe fn new() -> Self {
        Self { _priv: () }
    }
}

impl PhysIo for Mmio {
    #[inline(always)]
    fn read8(&mut self, addr: usize) -> u8 {
        unsafe { (addr as *const u8).read_volatile() }
    }

    #[inline(always)]
    fn write8(&mut self, addr: usize, v: u8) {
        unsafe { (addr as *mut u8).write_volatile(v) }
    }
}


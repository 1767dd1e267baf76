/// Monotonic tick counter used for the busy-waits in the reset sequence.
pub trait TickSource {
    fn now(&self) -> u64;

    /// Spins until `ticks` have elapsed. Not cancellable.
    fn sleep_ticks(&self, ticks: u64) {
        let deadline = self.now().saturating_add(ticks);
        while self.now() < deadline {
            core::hint::spin_loop();
        }
    }
}

/// The hart's `time` CSR.
#[cfg(target_arch = "riscv64")]
#[derive(Clone, Copy, Default)]
pub struct RiscvTime;

#[cfg(target_arch = "riscv64")]
impl TickSource for RiscvTime {
    #[inline(always)]
    fn now(&self) -> u64 {
        crate::riscv::r_time() as u64
    }
}

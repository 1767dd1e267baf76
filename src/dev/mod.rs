pub mod registry;

pub use registry::{DevHandle, DeviceRegistry};

pub type DevResult<T> = Result<T, DevError>;

#[derive(strum::FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(isize)]
pub enum DevError {
    InvalidCommand = -1,
    InvalidArgument = -2,
    NoMem = -3,
    NotFound = -4,
}

impl DevError {
    /// The firmware status code for this error.
    pub const fn status(self) -> isize {
        self as isize
    }
}

/// Collapses a result into the status code handed back across the firmware boundary.
pub fn status<T>(res: &DevResult<T>) -> isize {
    match res {
        Ok(_) => 0,
        Err(err) => err.status(),
    }
}

#[derive(strum::FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DevClass {
    Console = 1,
    Serial,
    Other,
}

/// Static description of a driver, shared by every instance it probes.
#[derive(Debug)]
pub struct DriverDesc {
    /// Human readable name, e.g. `NS16550 UART`
    pub description: &'static str,
    /// Prefix of the device names handed out at attach time
    pub bootname: &'static str,
    pub class: DevClass,
}

/// The operations every attached device exposes to the upper firmware layers.
///
/// `read` and `write` move as many bytes as the device can take right now and report the
/// count; a short (or empty) transfer is not an error.
pub trait Device {
    fn open(&mut self) -> DevResult<()>;
    fn read(&mut self, buf: &mut [u8]) -> DevResult<usize>;
    /// Whether at least one byte can be read without blocking.
    fn inpstat(&mut self) -> DevResult<bool>;
    fn write(&mut self, buf: &[u8]) -> DevResult<usize>;
    /// `param` is both input and output, depending on `cmd`.
    fn ioctl(&mut self, cmd: u32, param: &mut u32) -> DevResult<()>;
    fn close(&mut self) -> DevResult<()>;
}

pub mod ns16550;

pub use ns16550::{FlowControl, IoctlCmd, Ns16550, NS16550_UART};

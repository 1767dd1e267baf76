#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod config;
pub mod dev;
pub mod drivers;
pub mod physio;
#[cfg(target_arch = "riscv64")]
mod riscv;
pub mod timer;

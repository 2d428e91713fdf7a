#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod cpu;
pub mod decoder;
pub mod error;
pub mod instructions;
pub mod memory;
pub mod utils;

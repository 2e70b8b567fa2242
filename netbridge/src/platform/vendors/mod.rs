//! Built-in vendor platforms.

pub mod arista_eos;
pub mod cisco_ios;

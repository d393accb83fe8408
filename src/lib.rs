#![cfg_attr(not(test), no_std)]

#[cfg(test)]
extern crate core;
extern crate alloc;
extern crate byteorder;
extern crate fallible_iterator;
#[cfg(feature = "log")]
#[macro_use] extern crate log;
#[cfg(test)]
extern crate proptest;

#[cfg(not(feature = "log"))]
#[macro_use] mod no_log;

pub mod error;
pub mod features;
pub mod reader;
pub mod floathex;
pub mod binary;
pub mod text;

pub use error::*;
pub use features::*;
pub use reader::*;

pub const MAGIC_COOKIE: u32 = 0x6d736100;
pub const VERSION: u32 = 0x1;

#![doc = include_str!("../README.md")]

mod bytes;
mod error;

pub mod clock;
pub mod config;
pub mod decoder;
pub mod device_error;
pub mod groups;
pub mod integrity;
pub mod packet;
pub mod sample;
pub mod sync;

pub use error::{Error, Result};

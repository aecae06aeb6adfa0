#![no_std]
extern crate alloc;

pub mod quiz;
pub mod session;

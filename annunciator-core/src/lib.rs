#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Shared logic for the alarm annunciator.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware access is expressed through the traits in
// `io` and `diagnostics` so the same controller runs on the board and in the
// emulator.

pub mod clock;
pub mod debounce;
pub mod device;
pub mod diagnostics;
pub mod io;
pub mod sequencer;
pub mod timing;

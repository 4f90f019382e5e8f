//! Control core for a thermistor-driven DC fan behind a DCM buck stage.
//!
//! Pure math over caller-owned [`fan::Config`]/[`fan::State`] records; no
//! peripheral handle reaches this crate, so the same code runs on the target
//! and in host tests.
#![cfg_attr(not(test), no_std)]

pub mod buck;
pub mod consts;
pub mod fan;
pub mod filter;
pub mod thermistor;

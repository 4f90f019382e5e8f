use core::f32::consts::PI;

use micromath::F32Ext;

use crate::consts;

/// Single-pole low-pass over the temperature readings.
///
/// Smooths ADC jitter and, more importantly, keeps a single glitched sample
/// from kicking the fan state machine: with the cutoff at
/// [`consts::CUTOFF_FREQ_HZ`] a rail-to-rail spike moves the output well
/// under 1°C. Alpha comes from the bilinear transform of an RC low-pass at
/// the loop cadence.
pub fn filter_readings(new_value: f32, old_value: f32) -> f32 {
    let alpha =
        1.0 - 1.0 / (1.0 + (PI * consts::CUTOFF_FREQ_HZ / consts::SAMPLING_RATE_HZ).tan());
    alpha * new_value + (1.0 - alpha) * old_value
}

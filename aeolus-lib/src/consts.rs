/// Fixed leg of the thermistor voltage divider, measured in ohms
pub const REFERENCE_OHMS: f32 = 100_000.0;
/// 0°C in kelvin
pub const ZERO_C_IN_K: f32 = 273.0;
/// Analog to digital resolution
pub const ADC_RESOLUTION: f32 = 4096.0;
/// Samples wider than the nominal 12 bits are masked down to this
pub const ADC_CODE_MASK: u32 = 0xfff;
/// Floor for the normalized bridge reading; keeps the divider algebra away
/// from a division by zero and pins the resistance below 1e9 ohms
pub const MIN_VOLTAGE_RATIO: f32 = 1e-4;
/// A computed bridge resistance above this is a wiring fault
pub const MAX_BRIDGE_OHMS: f32 = 1e9;

/// PWM switching frequency of the buck stage
pub const PWM_FREQ_HZ: f32 = 24_000.0;

/// Control loop cadence the reading filter is designed for
pub const SAMPLING_RATE_HZ: f32 = 100.0;
/// Low-pass cutoff for the temperature readings
pub const CUTOFF_FREQ_HZ: f32 = 0.05;

// Deployed fan tuning.
/// 4% min works well for a 24V fan; use ~25% for a 12V fan
pub const MIN_DUTY_RATIO: f32 = 0.04;
pub const MAX_DUTY_RATIO: f32 = 1.0;
pub const SPINUP_DUTY_RATIO: f32 = 1.0;
pub const SPINUP_TIME_MS: u32 = 1500;
pub const MIN_TEMP_C: f32 = 40.0;
pub const MAX_TEMP_C: f32 = 85.0;
pub const TEMP_HYSTERESIS_C: f32 = 8.0;

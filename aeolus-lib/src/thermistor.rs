use defmt::Format;
use micromath::F32Ext;

use crate::consts;

/// B-parameter calibration of the sensing thermistor.
#[derive(Clone, Copy, Format)]
pub struct PtcThermistorConfig {
    /// Resistance at the nominal temperature, in ohms
    pub nominal_ohms: f32,
    /// Nominal temperature, in kelvin
    pub nominal_temp_k: f32,
    /// Beta coefficient from the datasheet
    pub beta: f32,
}

impl PtcThermistorConfig {
    /// 10k at 25°C, beta 3950 (the part on the current board)
    pub const R10K_B3950: Self = Self {
        nominal_ohms: 10_000.0,
        nominal_temp_k: 25.0 + consts::ZERO_C_IN_K,
        beta: 3950.0,
    };

    /// 100k at 25°C, beta 3950
    pub const R100K_B3950: Self = Self {
        nominal_ohms: 100_000.0,
        nominal_temp_k: 25.0 + consts::ZERO_C_IN_K,
        beta: 3950.0,
    };

    pub fn is_valid(&self) -> bool {
        self.nominal_ohms > 0.0 && self.nominal_temp_k > 0.0 && self.beta > 0.0
    }
}

/// Normalizes a raw ADC code to a voltage ratio in (0, 1].
///
/// Codes wider than 12 bits are masked down, and the result is floored at
/// [`consts::MIN_VOLTAGE_RATIO`] so a shorted or missing sensor degrades to
/// a boundary reading instead of dividing by zero downstream.
pub fn counts_to_ratio(counts: u32) -> f32 {
    let ratio = (counts & consts::ADC_CODE_MASK) as f32 / consts::ADC_RESOLUTION;
    ratio.clamp(consts::MIN_VOLTAGE_RATIO, 1.0)
}

/// Voltage-divider algebra: the supply cancels out, so the measured ratio
/// alone recovers the unknown leg from the known one.
///
/// A result outside [0, 1e9] ohms means miswired hardware or corrupt
/// calibration, not a noisy sample, and aborts.
pub fn ratio_to_unknown_bridge_resistance(voltage_ratio: f32, known_resistance: f32) -> f32 {
    assert!(voltage_ratio > 1e-5 && voltage_ratio <= 1.0);
    let ohms = known_resistance * (1.0 / voltage_ratio - 1.0);
    assert!((0.0..=consts::MAX_BRIDGE_OHMS).contains(&ohms));
    ohms
}

/// B-parameter equation, see
/// <https://en.wikipedia.org/wiki/Thermistor#B_or_%CE%B2_parameter_equation>
pub fn resistance_to_temp_c(thermistor_ohms: f32, config: &PtcThermistorConfig) -> f32 {
    assert!(config.is_valid());
    let inv_temp_k = 1.0 / config.nominal_temp_k
        + (1.0 / config.beta) * (thermistor_ohms / config.nominal_ohms).ln();
    1.0 / inv_temp_k - consts::ZERO_C_IN_K
}

/// Raw ADC code to °C. Finite for every unsigned input; the clamp in
/// [`counts_to_ratio`] guarantees it without range checks later on.
pub fn temp_counts_to_c(counts: u32, config: &PtcThermistorConfig) -> f32 {
    let voltage_ratio = counts_to_ratio(counts);
    let thermistor_ohms = ratio_to_unknown_bridge_resistance(voltage_ratio, consts::REFERENCE_OHMS);
    resistance_to_temp_c(thermistor_ohms, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_resistance_reads_nominal_temp() {
        let t = resistance_to_temp_c(10_000.0, &PtcThermistorConfig::R10K_B3950);
        assert!((t - 25.0).abs() < 0.1);
    }

    #[test]
    fn datasheet_points_are_close() {
        // R-T table values for the 10k/3950 part; the beta model is only an
        // approximation away from the nominal point
        let cold = resistance_to_temp_c(172_478.0, &PtcThermistorConfig::R10K_B3950);
        assert!((cold - -30.0).abs() < 3.5);
        let hot = resistance_to_temp_c(650.0, &PtcThermistorConfig::R10K_B3950);
        assert!((hot - 100.0).abs() < 3.5);
    }

    #[test]
    fn bridge_resistance_algebra() {
        assert!((ratio_to_unknown_bridge_resistance(0.5, 100_000.0) - 100_000.0).abs() < 10.0);
        assert!((ratio_to_unknown_bridge_resistance(0.25, 100_000.0) - 300_000.0).abs() < 10.0);
        assert!((ratio_to_unknown_bridge_resistance(0.75, 100_000.0) - 33_333.3).abs() < 10.0);
    }

    #[test]
    fn counts_are_masked_and_floored() {
        assert_eq!(counts_to_ratio(0), consts::MIN_VOLTAGE_RATIO);
        assert_eq!(counts_to_ratio(2048), 0.5);
        // bit 12 and up fall off; 0x1000 aliases to code 0
        assert_eq!(counts_to_ratio(0x1000), consts::MIN_VOLTAGE_RATIO);
        assert_eq!(counts_to_ratio(u32::MAX), 4095.0 / 4096.0);
    }

    #[test]
    fn every_code_stays_finite_and_sane() {
        let config = PtcThermistorConfig::R10K_B3950;
        for code in 0..=4095u32 {
            let t = temp_counts_to_c(code, &config);
            assert!(t.is_finite(), "code {code} -> {t}");
            assert!((-150.0..=300.0).contains(&t), "code {code} -> {t}");
        }
        // oversized samples take the same path through the mask
        for code in [4096, 0xffff, 0xdead_beef, u32::MAX] {
            let t = temp_counts_to_c(code, &config);
            assert!(t.is_finite() && (-150.0..=300.0).contains(&t));
        }
    }

    #[test]
    #[should_panic]
    fn bad_calibration_aborts() {
        resistance_to_temp_c(10_000.0, &PtcThermistorConfig {
            nominal_ohms: 10_000.0,
            nominal_temp_k: 298.0,
            beta: 0.0,
        });
    }

    #[test]
    #[should_panic]
    fn impossible_ratio_aborts() {
        ratio_to_unknown_bridge_resistance(1e-6, 100_000.0);
    }
}

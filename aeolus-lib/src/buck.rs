use defmt::Format;
use micromath::F32Ext;

use crate::consts;

/// Electrical design point of the buck stage feeding the fan.
///
/// The converter runs in discontinuous conduction mode, where the duty
/// cycle depends on the load and the input voltage, not just on the wanted
/// output ratio. Graphed across 12V/24V inputs and 0.1-0.3A loads the curve
/// stays close to this design point, so one representative set of values is
/// enough per deployment.
#[derive(Clone, Copy, Format)]
pub struct DcmBuckConfig {
    pub input_voltage_v: f32,
    pub inductance_h: f32,
    /// Representative load current; the fan moves around it with speed
    pub output_current_a: f32,
    pub switching_freq_hz: f32,
}

impl DcmBuckConfig {
    pub fn is_valid(&self) -> bool {
        self.input_voltage_v > 0.0
            && self.inductance_h > 0.0
            && self.output_current_a > 0.0
            && self.switching_freq_hz > 0.0
    }
}

impl Default for DcmBuckConfig {
    /// 12V supply, 47µH inductor, 0.2A fan — the most common use case
    fn default() -> Self {
        Self {
            input_voltage_v: 12.0,
            inductance_h: 47e-6,
            output_current_a: 0.2,
            switching_freq_hz: consts::PWM_FREQ_HZ,
        }
    }
}

/// Solves the DCM buck equation for the duty cycle that yields the wanted
/// output:input voltage ratio.
///
/// <https://en.wikipedia.org/wiki/Buck_converter#Discontinuous_mode>,
/// solved for the duty cycle:
/// `D = sqrt(2 Vo L Io) / sqrt(Vi² T - Vi Vo T)`
///
/// The solution crosses 1.0 a little below unity ratio (around 0.96 at the
/// default design point); saturating there is expected, not an error.
pub fn ratio_to_dcm_buck_duty_cycle(voltage_ratio: f32, config: &DcmBuckConfig) -> f32 {
    assert!(config.is_valid());

    let ratio = voltage_ratio.clamp(0.0, 1.0);
    let period = 1.0 / config.switching_freq_hz;
    let input_voltage = config.input_voltage_v;
    let output_voltage = ratio * input_voltage;

    let top = (2.0 * output_voltage * config.inductance_h * config.output_current_a).sqrt();
    let bottom = (input_voltage * input_voltage * period
        - input_voltage * output_voltage * period)
        .sqrt();
    (top / bottom).clamp(0.0, 1.0)
}

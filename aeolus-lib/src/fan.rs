use defmt::Format;

use crate::consts;
use crate::filter::filter_readings;

/// Trapezoid fan curve with a spin-up kick and turn-off hysteresis.
#[derive(Clone, Copy, Format)]
pub struct Config {
    /// Lowest ratio a running fan is driven at; keep it above the stall
    /// point of a fan that is already spinning
    pub fan_min_duty_cycle: f32,
    /// Ratio at and above `temp_max_c`
    pub fan_max_duty_cycle: f32,
    /// Drive applied while the rotor comes up from a standstill. 100% is a
    /// good choice; tune the spin-up time for quiet operation instead
    pub fan_spinup_duty_cycle: f32,
    /// How long the rotor needs to come up, usually 1-2 seconds
    pub fan_spinup_time_ms: u32,
    /// Below this the fan stays off; at it, the fan turns on
    pub temp_min_c: f32,
    /// At this the fan runs flat out
    pub temp_max_c: f32,
    /// How far under `temp_min_c` the filtered temperature must drop before
    /// a running fan shuts off, so it does not chatter around the threshold
    pub temp_hysteresis_c: f32,
}

impl Config {
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.fan_min_duty_cycle)
            && (0.0..=1.0).contains(&self.fan_max_duty_cycle)
            && (0.0..=1.0).contains(&self.fan_spinup_duty_cycle)
            && self.fan_min_duty_cycle <= self.fan_max_duty_cycle
            && self.temp_min_c < self.temp_max_c
            && self.temp_hysteresis_c >= 0.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fan_min_duty_cycle: consts::MIN_DUTY_RATIO,
            fan_max_duty_cycle: consts::MAX_DUTY_RATIO,
            fan_spinup_duty_cycle: consts::SPINUP_DUTY_RATIO,
            fan_spinup_time_ms: consts::SPINUP_TIME_MS,
            temp_min_c: consts::MIN_TEMP_C,
            temp_max_c: consts::MAX_TEMP_C,
            temp_hysteresis_c: consts::TEMP_HYSTERESIS_C,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Format)]
pub enum FanState {
    Off,
    Spinup,
    On,
}

/// Per-fan control state, owned by the calling loop and mutated only by
/// [`fan_voltage_ratio`].
#[derive(Clone, Copy, Debug, Format)]
pub struct State {
    pub state: FanState,
    pub last_change_time_ms: u32,
    pub last_filtered_temp_c: f32,
}

impl State {
    /// Fan off, reading filter seeded at ambient so the first samples do
    /// not slew in from zero.
    pub const fn new(ambient_temp_c: f32) -> Self {
        Self {
            state: FanState::Off,
            last_change_time_ms: 0,
            last_filtered_temp_c: ambient_temp_c,
        }
    }

    fn transition(&mut self, new_state: FanState, current_ms: u32) {
        self.state = new_state;
        self.last_change_time_ms = current_ms;
    }
}

/// Linear interpolation between two points, with x clamped to [x0, x1]
fn interpolate(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let x_clamped = x.clamp(x0, x1);
    y0 + (x_clamped - x0) / (x1 - x0) * (y1 - y0)
}

/// Desired output:input voltage ratio for the fan given a fresh temperature
/// sample. Call once per control cycle; filters the sample and advances the
/// state machine, at most one transition per call beyond a spin-up timeout
/// falling through into ON.
///
/// The ratio is not yet a duty cycle: the drive stage is a buck converter
/// in discontinuous conduction mode, see
/// [`crate::buck::ratio_to_dcm_buck_duty_cycle`].
pub fn fan_voltage_ratio(
    new_temp_c: f32,
    current_ms: u32,
    config: &Config,
    state: &mut State,
) -> f32 {
    let temp_c = filter_readings(new_temp_c, state.last_filtered_temp_c);
    state.last_filtered_temp_c = temp_c;

    // A transition finishes inside the call that triggers it: OFF crossing
    // the threshold is evaluated as SPINUP right away, and a SPINUP that
    // just timed out is evaluated as ON. Three passes cover the longest
    // walk, OFF -> SPINUP -> ON with a zero spin-up time.
    for _ in 0..3 {
        match state.state {
            FanState::Off => {
                if temp_c < config.temp_min_c {
                    return 0.0;
                }
                state.transition(FanState::Spinup, current_ms);
            }
            FanState::Spinup => {
                // wrapping subtraction stays correct across the 49.7-day
                // rollover of the millisecond tick
                let elapsed_ms = current_ms.wrapping_sub(state.last_change_time_ms);
                if elapsed_ms < config.fan_spinup_time_ms {
                    return config.fan_spinup_duty_cycle;
                }
                state.transition(FanState::On, current_ms);
            }
            FanState::On => {
                if temp_c < config.temp_min_c - config.temp_hysteresis_c {
                    state.transition(FanState::Off, current_ms);
                    return 0.0;
                }
                return interpolate(
                    temp_c,
                    config.temp_min_c,
                    config.temp_max_c,
                    config.fan_min_duty_cycle,
                    config.fan_max_duty_cycle,
                );
            }
        }
    }
    unreachable!()
}

//! Temperature-controlled fan driver: thermistor bridge in on ADC1/PB0, DCM
//! buck PWM out on TIM2/PA1.

#![no_main]
#![no_std]

use aeolus_firmware::FanPwmTimer;
use aeolus_lib::{
    buck::{ratio_to_dcm_buck_duty_cycle, DcmBuckConfig},
    consts,
    fan::{fan_voltage_ratio, Config, State},
    thermistor::{temp_counts_to_c, PtcThermistorConfig},
};
use cortex_m_rt::entry;
use stm32f1xx_hal::{
    adc::Adc,
    gpio::{gpiob::PB0, Analog},
    pac,
    prelude::*,
    pwm::Channel,
    timer::Timer,
    watchdog::IndependentWatchdog,
};

/// Control loop cadence; the reading filter is designed around this rate
const LOOP_PERIOD_MS: u32 = 10;
/// Conversions averaged per temperature reading
const ADC_SAMPLES: u32 = 64;
/// Filter seed until real readings arrive
const AMBIENT_TEMP_C: f32 = 25.0;

#[entry]
fn main() -> ! {
    let p = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = p.FLASH.constrain();
    let mut rcc = p.RCC.constrain();

    let clocks = rcc.cfgr.adcclk(1.mhz()).freeze(&mut flash.acr);

    // resets the device if the control loop ever stalls
    let mut watchdog = IndependentWatchdog::new(p.IWDG);
    watchdog.start(1000.ms());

    let mut adc1 = Adc::adc1(p.ADC1, &mut rcc.apb2, clocks);

    let mut afio = p.AFIO.constrain(&mut rcc.apb2);
    let mut gpioa = p.GPIOA.split(&mut rcc.apb2);
    let mut gpiob = p.GPIOB.split(&mut rcc.apb2);

    // thermistor bridge
    let mut therm_pin = gpiob.pb0.into_analog(&mut gpiob.crl);

    // TIM2 pins; the buck stage switch sits on channel 2
    let a0 = gpioa.pa0.into_alternate_push_pull(&mut gpioa.crl);
    let a1 = gpioa.pa1.into_alternate_push_pull(&mut gpioa.crl);
    let a2 = gpioa.pa2.into_alternate_push_pull(&mut gpioa.crl);
    let a3 = gpioa.pa3.into_alternate_push_pull(&mut gpioa.crl);
    let mut pwm_out: FanPwmTimer = Timer::tim2(p.TIM2, &clocks, &mut rcc.apb1).pwm(
        (a0, a1, a2, a3),
        &mut afio.mapr,
        (consts::PWM_FREQ_HZ as u32).hz(),
    );
    pwm_out.enable(Channel::C2);
    pwm_out.set_duty(Channel::C2, 0);
    let max_pwm_duty = pwm_out.get_max_duty();

    let mut timer_sys = Timer::syst(cp.SYST, &clocks).start_count_down(LOOP_PERIOD_MS.ms());

    let config = Config::default();
    defmt::assert!(config.is_valid());
    let buck = DcmBuckConfig::default();
    let thermistor = PtcThermistorConfig::R10K_B3950;

    let mut state = State::new(AMBIENT_TEMP_C);
    let mut now_ms: u32 = 0;

    defmt::info!("fan controller up, pwm max duty {}", max_pwm_duty);

    loop {
        nb::block!(timer_sys.wait()).unwrap();
        // good enough as a millisecond clock; wraps after 49.7 days, which
        // the state machine handles
        now_ms = now_ms.wrapping_add(LOOP_PERIOD_MS);

        if let Some(counts) = read_thermistor_counts(&mut adc1, &mut therm_pin) {
            let temp_c = temp_counts_to_c(counts, &thermistor);

            let was = state.state;
            let ratio = fan_voltage_ratio(temp_c, now_ms, &config, &mut state);
            if state.state != was {
                defmt::info!("fan {} -> {} at {}", was, state.state, temp_c);
            }

            let duty_cycle = ratio_to_dcm_buck_duty_cycle(ratio, &buck);
            defmt::trace!("temp {} ratio {} duty {}", temp_c, ratio, duty_cycle);

            pwm_out.set_duty(Channel::C2, (duty_cycle * f32::from(max_pwm_duty)) as u16);
        }

        watchdog.feed();
    }
}

/// Averages a burst of conversions; a single conversion is jittery enough
/// to be audible on the fan curve.
fn read_thermistor_counts(adc: &mut Adc<pac::ADC1>, pin: &mut PB0<Analog>) -> Option<u32> {
    let mut sum = 0u32;
    for _ in 0..ADC_SAMPLES {
        let sample: u16 = adc.read(pin).ok()?;
        sum += u32::from(sample);
    }
    Some(sum / ADC_SAMPLES)
}

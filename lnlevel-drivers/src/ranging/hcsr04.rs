//! HC-SR04 ultrasonic ranging module
//!
//! ```text
//! TRIG  ___|‾‾‾‾|_____________________________
//!           10 µs
//! ECHO  ______________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾|________
//!                     └─ round trip ─┘
//! ```
//!
//! A 10 µs pulse on TRIG fires a burst; ECHO is held high for as long as
//! the sound took to come back. Echo timing is busy-waited against a
//! microsecond clock. Pings are spaced by at least `ping_interval_ms` so
//! late echoes of the previous burst are not mistaken for the next one.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use lnlevel_core::config::SamplingConfig;
use lnlevel_core::traits::{RangingError, RangingSensor};
use lnlevel_hal::Monotonic;

/// Trigger pulse width
const TRIGGER_PULSE_US: u32 = 10;

/// Settle time with TRIG low before the pulse
const TRIGGER_SETTLE_US: u32 = 2;

/// HC-SR04 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hcsr04Config {
    /// Minimum time between trigger pulses
    pub ping_interval_us: u32,
    /// Maximum wait for each echo edge
    pub echo_timeout_us: u32,
    /// ECHO is active-low (level shifter inverts it)
    pub echo_inverted: bool,
}

impl Hcsr04Config {
    /// Derive driver timing from the sampling settings
    pub fn from_sampling(sampling: &SamplingConfig, echo_inverted: bool) -> Self {
        Self {
            ping_interval_us: sampling.ping_interval_ms as u32 * 1000,
            echo_timeout_us: sampling.echo_timeout_us,
            echo_inverted,
        }
    }
}

impl Default for Hcsr04Config {
    fn default() -> Self {
        Self::from_sampling(&SamplingConfig::default(), false)
    }
}

/// HC-SR04 on two GPIOs
pub struct Hcsr04<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    config: Hcsr04Config,
    last_ping_us: Option<u64>,
}

impl<T, E, D, C> Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Monotonic,
{
    /// Create a driver; TRIG is driven low immediately
    pub fn new(mut trigger: T, echo: E, delay: D, clock: C, config: Hcsr04Config) -> Self {
        // A failure here shows up again on the first ping
        let _ = trigger.set_low();
        Self {
            trigger,
            echo,
            delay,
            clock,
            config,
            last_ping_us: None,
        }
    }

    fn echo_active(&mut self) -> Result<bool, RangingError> {
        let high = self.echo.is_high().map_err(|_| RangingError::Pin)?;
        Ok(high != self.config.echo_inverted)
    }

    /// Busy-wait until ECHO reaches `active`; returns the time it did
    fn wait_for_echo(&mut self, active: bool) -> Result<Option<u64>, RangingError> {
        let start = self.clock.now_us();
        loop {
            if self.echo_active()? == active {
                return Ok(Some(self.clock.now_us()));
            }
            if self.clock.elapsed_us(start) > self.config.echo_timeout_us as u64 {
                return Ok(None);
            }
        }
    }

    fn wait_ping_interval(&mut self) {
        if let Some(last) = self.last_ping_us {
            let elapsed = self.clock.elapsed_us(last);
            let interval = self.config.ping_interval_us as u64;
            if elapsed < interval {
                self.delay.delay_us((interval - elapsed) as u32);
            }
        }
    }

    fn pulse_trigger(&mut self) -> Result<(), RangingError> {
        self.trigger.set_low().map_err(|_| RangingError::Pin)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high().map_err(|_| RangingError::Pin)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| RangingError::Pin)
    }
}

impl<T, E, D, C> RangingSensor for Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Monotonic,
{
    fn ping_us(&mut self) -> Result<u32, RangingError> {
        self.wait_ping_interval();

        // Previous echo must have ended before a new burst
        if self.wait_for_echo(false)?.is_none() {
            return Err(RangingError::EchoStuck);
        }

        self.pulse_trigger()?;
        self.last_ping_us = Some(self.clock.now_us());

        let rise = self.wait_for_echo(true)?.ok_or(RangingError::NoEcho)?;
        let fall = self.wait_for_echo(false)?.ok_or(RangingError::NoEcho)?;

        Ok(fall.saturating_sub(rise).min(u32::MAX as u64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Simulated bench: one clock shared by the pins, delay and module
    #[derive(Default)]
    struct Bench {
        now_us: u64,
        trigger_high: bool,
        /// Times TRIG fell at the end of a pulse
        triggers: Vec<u64>,
        /// Echo (delay after trigger, width); None = nothing in range
        echo: Option<(u64, u64)>,
        echo_stuck: bool,
    }

    type Shared = Rc<RefCell<Bench>>;

    struct Trig(Shared);
    struct Echo(Shared);
    struct Delay(Shared);
    struct Clock(Shared);

    impl ErrorType for Trig {
        type Error = Infallible;
    }

    impl OutputPin for Trig {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let mut b = self.0.borrow_mut();
            if b.trigger_high {
                let now = b.now_us;
                b.triggers.push(now);
            }
            b.trigger_high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().trigger_high = true;
            Ok(())
        }
    }

    impl ErrorType for Echo {
        type Error = Infallible;
    }

    impl InputPin for Echo {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            let mut b = self.0.borrow_mut();
            // Each poll costs a microsecond
            b.now_us += 1;
            if b.echo_stuck {
                return Ok(true);
            }
            let high = match (b.triggers.last(), b.echo) {
                (Some(&t), Some((after, width))) => {
                    b.now_us >= t + after && b.now_us < t + after + width
                }
                _ => false,
            };
            Ok(high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    impl DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().now_us += (ns as u64).div_ceil(1000);
        }
    }

    impl Monotonic for Clock {
        fn now_us(&self) -> u64 {
            self.0.borrow().now_us
        }
    }

    fn sensor(bench: &Shared) -> Hcsr04<Trig, Echo, Delay, Clock> {
        Hcsr04::new(
            Trig(bench.clone()),
            Echo(bench.clone()),
            Delay(bench.clone()),
            Clock(bench.clone()),
            Hcsr04Config::default(),
        )
    }

    #[test]
    fn test_measures_echo_width() {
        let bench: Shared = Default::default();
        bench.borrow_mut().echo = Some((400, 5831));
        let mut s = sensor(&bench);

        let us = s.ping_us().unwrap();
        assert!((5830..=5832).contains(&us), "echo width {}", us);
        assert_eq!(bench.borrow().triggers.len(), 1);
    }

    #[test]
    fn test_no_echo_times_out() {
        let bench: Shared = Default::default();
        let mut s = sensor(&bench);

        assert_eq!(s.ping_us(), Err(RangingError::NoEcho));
        // Gave up shortly after the timeout
        let now = bench.borrow().now_us;
        assert!(now <= 23_200 + 100);
    }

    #[test]
    fn test_echo_that_never_ends_times_out() {
        let bench: Shared = Default::default();
        bench.borrow_mut().echo = Some((400, 1_000_000));
        let mut s = sensor(&bench);
        assert_eq!(s.ping_us(), Err(RangingError::NoEcho));
    }

    #[test]
    fn test_stuck_echo_line() {
        let bench: Shared = Default::default();
        bench.borrow_mut().echo_stuck = true;
        let mut s = sensor(&bench);

        assert_eq!(s.ping_us(), Err(RangingError::EchoStuck));
        assert!(bench.borrow().triggers.is_empty());
    }

    #[test]
    fn test_pings_are_spaced() {
        let bench: Shared = Default::default();
        bench.borrow_mut().echo = Some((400, 1000));
        let mut s = sensor(&bench);

        s.ping_us().unwrap();
        s.ping_us().unwrap();

        let b = bench.borrow();
        assert_eq!(b.triggers.len(), 2);
        assert!(b.triggers[1] - b.triggers[0] >= 29_000);
    }

    #[test]
    fn test_inverted_echo() {
        let bench: Shared = Default::default();
        let mut config = Hcsr04Config::default();
        config.echo_inverted = true;
        // Inverted line idles high; nothing in range keeps it there
        let mut s = Hcsr04::new(
            Trig(bench.clone()),
            Echo(bench.clone()),
            Delay(bench.clone()),
            Clock(bench.clone()),
            config,
        );
        bench.borrow_mut().echo_stuck = true;
        assert_eq!(s.ping_us(), Err(RangingError::NoEcho));
        assert_eq!(bench.borrow().triggers.len(), 1);
    }

    #[test]
    fn test_config_from_sampling() {
        let sampling = SamplingConfig {
            ping_interval_ms: 60,
            echo_timeout_us: 30_000,
            ..Default::default()
        };
        let config = Hcsr04Config::from_sampling(&sampling, true);
        assert_eq!(config.ping_interval_us, 60_000);
        assert_eq!(config.echo_timeout_us, 30_000);
        assert!(config.echo_inverted);
    }
}

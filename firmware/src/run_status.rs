/*++

Licensed under the Apache-2.0 license.

File Name:

    run_status.rs

Abstract:

    File contains the campaign outcome and how it is shown on the status LED.

--*/

use reram_drivers::{Clock, Level, OutputPin, ReramError};

/// Outcome of a campaign run.
///
/// Ordered from best to worst so outcomes can be combined with `max`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum RunStatus {
    /// Everything went fine.
    Okay,

    /// Measurements ran but some results could not be persisted.
    FailedPartially,

    /// Nothing useful was produced.
    FailedTotally,
}

impl RunStatus {
    /// Keep the worse of `self` and `other`.
    pub fn downgrade(&mut self, other: RunStatus) {
        *self = (*self).max(other);
    }

    /// Status a campaign ends with when it stops on `err`.
    pub fn from_error(err: ReramError) -> Self {
        if err.is_storage() {
            Self::FailedPartially
        } else {
            Self::FailedTotally
        }
    }

    pub fn led_pattern(&self) -> LedPattern {
        match self {
            Self::Okay => LedPattern::Blink {
                on_ms: 200,
                off_ms: 200,
            },
            Self::FailedPartially => LedPattern::Blink {
                on_ms: 2000,
                off_ms: 2000,
            },
            Self::FailedTotally => LedPattern::Solid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Okay => "okay",
            Self::FailedPartially => "failed partially",
            Self::FailedTotally => "failed totally",
        }
    }
}

/// What the status LED does once a run has stopped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LedPattern {
    Blink { on_ms: u32, off_ms: u32 },
    Solid,
}

/// Blink `led` `count` times.
pub fn blink<C: Clock + ?Sized>(
    led: &mut dyn OutputPin,
    clock: &mut C,
    count: u32,
    on_ms: u32,
    off_ms: u32,
) {
    for _ in 0..count {
        led.write(Level::High);
        clock.sleep_ms(on_ms);
        led.write(Level::Low);
        clock.sleep_ms(off_ms);
    }
}

/// Show `status` on the LED. Blink patterns repeat `blinks` times; on the
/// board this is large enough to never end.
pub fn indicate_stop<C: Clock + ?Sized>(
    status: RunStatus,
    led: &mut dyn OutputPin,
    clock: &mut C,
    blinks: u32,
) {
    match status.led_pattern() {
        LedPattern::Blink { on_ms, off_ms } => blink(led, clock, blinks, on_ms, off_ms),
        LedPattern::Solid => led.write(Level::High),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reram_hw_model::{RecordingPin, SimClock};

    #[test]
    fn test_downgrade_keeps_worst() {
        let mut status = RunStatus::Okay;
        status.downgrade(RunStatus::FailedPartially);
        assert_eq!(status, RunStatus::FailedPartially);
        status.downgrade(RunStatus::Okay);
        assert_eq!(status, RunStatus::FailedPartially);
        status.downgrade(RunStatus::FailedTotally);
        assert_eq!(status, RunStatus::FailedTotally);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            RunStatus::from_error(ReramError::FW_STORAGE_WRITE_FAILED),
            RunStatus::FailedPartially
        );
        assert_eq!(
            RunStatus::from_error(ReramError::DRIVER_SPI_TRANSFER_INCOMPLETE),
            RunStatus::FailedTotally
        );
    }

    #[test]
    fn test_indicate_stop() {
        let mut led = RecordingPin::default();
        let mut clock = SimClock::default();
        indicate_stop(RunStatus::FailedPartially, &mut led, &mut clock, 3);
        assert_eq!(led.pulses(), 2);
        assert_eq!(led.levels().len(), 6);
        assert_eq!(clock.peek(), 3 * 4000 * 1000);

        let mut led = RecordingPin::default();
        indicate_stop(RunStatus::FailedTotally, &mut led, &mut clock, 3);
        assert_eq!(led.levels(), &[Level::High]);
    }
}

// Licensed under the Apache-2.0 license

use std::cell::Cell;
use std::rc::Rc;

use reram_drivers::Clock;

/// Manually driven system timer, one tick per simulated microsecond.
///
/// Clones share the same time base, so the chip model and the firmware under
/// test see one clock.
#[derive(Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn peek(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl Clock for SimClock {
    fn now_ticks(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let mut clock = SimClock::default();
        let other = clock.clone();
        other.advance(7);
        assert_eq!(clock.now_ticks(), 7);
        clock.sleep_ms(2);
        assert_eq!(other.peek(), 2_007);
    }
}

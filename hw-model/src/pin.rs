// Licensed under the Apache-2.0 license

use reram_drivers::{Level, OutputPin};

/// GPIO output that remembers every level driven onto it.
#[derive(Debug, Default)]
pub struct RecordingPin {
    levels: Vec<Level>,
}

impl RecordingPin {
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level currently driven, `None` before the first write.
    pub fn level(&self) -> Option<Level> {
        self.levels.last().copied()
    }

    /// Number of Low to High transitions seen.
    pub fn pulses(&self) -> usize {
        self.levels
            .windows(2)
            .filter(|w| w[0] == Level::Low && w[1] == Level::High)
            .count()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

impl OutputPin for RecordingPin {
    fn write(&mut self, level: Level) {
        self.levels.push(level);
    }
}

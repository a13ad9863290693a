// Licensed under the Apache-2.0 license

use std::fmt::Display;
use std::io::{LineWriter, Write};

use reram_drivers::LogSink;

use crate::SimClock;

struct PrettyU64(u64);
impl Display for PrettyU64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const RANKS: [u64; 7] = [
            1_000_000_000_000_000_000,
            1_000_000_000_000_000,
            1_000_000_000_000,
            1_000_000_000,
            1_000_000,
            1_000,
            1,
        ];
        const PADDING_RANK: u64 = 1_000_000_000;
        let mut prev_numbers = false;
        for rank in RANKS {
            if (self.0 / rank) > 0 || rank == 1 {
                if prev_numbers {
                    write!(f, "{:03}", (self.0 / rank) % 1000)?;
                } else if rank >= PADDING_RANK {
                    write!(f, "{}", (self.0 / rank) % 1000)?;
                } else {
                    write!(f, "{:>3}", (self.0 / rank) % 1000)?;
                }
                if rank > 1 {
                    write!(f, ",")?;
                }
                prev_numbers = true;
            } else if rank < PADDING_RANK {
                write!(f, "    ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[test]
fn test_pretty_u64() {
    assert_eq!(PrettyU64(0).to_string(), "          0");
    assert_eq!(PrettyU64(999).to_string(), "        999");
    assert_eq!(PrettyU64(1_000).to_string(), "      1,000");
    assert_eq!(PrettyU64(999_999).to_string(), "    999,999");
    assert_eq!(PrettyU64(1_000_001).to_string(), "  1,000,001");
    assert_eq!(PrettyU64(1_999_999_999).to_string(), "1,999,999,999");
}

struct Echo {
    writer: LineWriter<Box<dyn Write>>,
    clock: SimClock,
    at_start_of_line: bool,
}

/// Log sink that keeps everything the firmware printed.
///
/// Optionally echoes each line to a writer, prefixed with the simulated time
/// in microseconds.
#[derive(Default)]
pub struct LogCapture {
    output: String,
    echo: Option<Echo>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_echo(writer: impl Write + 'static, clock: SimClock) -> Self {
        Self {
            output: String::new(),
            echo: Some(Echo {
                writer: LineWriter::new(Box::new(writer)),
                clock,
                at_start_of_line: true,
            }),
        }
    }

    /// Peek at all the output captured so far
    pub fn peek(&self) -> &str {
        &self.output
    }

    /// Take at most `limit` characters from the output
    pub fn take(&mut self, limit: usize) -> String {
        if self.output.len() <= limit {
            std::mem::take(&mut self.output)
        } else {
            let remaining = self.output[limit..].to_string();
            let mut result = std::mem::replace(&mut self.output, remaining);
            result.truncate(limit);
            result
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.output.contains(term)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }
}

impl LogSink for LogCapture {
    fn write_str(&mut self, s: &str) {
        self.output.push_str(s);

        let Some(echo) = &mut self.echo else {
            return;
        };
        // Losing echo output must not disturb the firmware under test.
        for line in s.split_inclusive('\n') {
            if echo.at_start_of_line {
                let _ = write!(echo.writer, "{} ", PrettyU64(echo.clock.peek()));
                echo.at_start_of_line = false;
            }
            let _ = echo.writer.write_all(line.as_bytes());
            if line.ends_with('\n') {
                echo.at_start_of_line = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<u8>>>);

    impl Write for Log {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_take() {
        let mut out = LogCapture::new();
        out.write_str("hello world\n");
        assert_eq!(out.take(5), "hello");
        assert_eq!(out.peek(), " world\n");
        assert_eq!(out.take(100), " world\n");
        assert_eq!(out.peek(), "");
    }

    #[test]
    fn test_echo_prefixes_each_line_with_time() {
        let log = Log::default();
        let clock = SimClock::default();
        let mut out = LogCapture::with_echo(log.clone(), clock.clone());

        clock.advance(1_500);
        out.write_str("first ");
        out.write_str("line\nsecond");
        clock.advance(1);
        out.write_str(" line\n");
        drop(out);

        assert_eq!(
            String::from_utf8(log.0.borrow().clone()).unwrap(),
            "      1,500 first line\n      1,500 second line\n"
        );
    }
}

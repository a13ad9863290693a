/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the run configuration loaded from `params.properties`.

--*/

use reram_drivers::{MemoryConfig, PollLimit, ReramError, ReramResult};
use reram_entropy::{Mt19937, Tries};

/// Properties file read from the root of the SD card.
pub const PARAMS_FILE: &str = "params.properties";

/// Campaign selected by the `mode` key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunMode {
    /// Log one latency bit every few seconds.
    Demo,

    /// Bulk random bit generation.
    Trng,

    /// Latency sweep over fixed cells and value pairs.
    Raw,

    /// Wear out the reference cells.
    BurnOut,

    /// Write/read-back check over every cell.
    SelfTest,
}

impl RunMode {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "demo" => Some(Self::Demo),
            "trng" => Some(Self::Trng),
            "raw" => Some(Self::Raw),
            "burnout" => Some(Self::BurnOut),
            "selftest" => Some(Self::SelfTest),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Trng => "trng",
            Self::Raw => "raw",
            Self::BurnOut => "burnout",
            Self::SelfTest => "selftest",
        }
    }
}

/// Largest `bits` request; the bulk generation holds every bit in memory.
pub const MAX_BITS: u32 = 10_000_000;

/// Settings for one firmware run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RunConfig {
    pub mode: RunMode,

    /// Part the file was written for; must match the board when present.
    pub device: Option<MemoryConfig>,

    /// Bits produced by the bulk generation.
    pub bits: u32,

    /// Bits between two timing checkpoints.
    pub checkpoint: u32,

    /// Pair budget for each extracted bit.
    pub tries: Tries,

    /// Bound on every write-in-progress poll.
    pub poll_limit: PollLimit,

    /// Seed of the address and value generator.
    pub seed: u32,

    /// Burn-out driver writes between two probes.
    pub check_interval: u32,

    /// Demo measurements before stopping; `None` runs until one fails.
    pub demo_rounds: Option<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Trng,
            device: None,
            bits: 500_000,
            checkpoint: 10_000,
            tries: Tries::Unbounded,
            poll_limit: PollLimit::Forever,
            seed: Mt19937::DEFAULT_SEED,
            check_interval: 1000,
            demo_rounds: None,
        }
    }
}

/// Properties file error and the 1-based line it was found on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConfigError {
    pub line: u32,
    pub error: ReramError,
}

impl RunConfig {
    /// Parse `key=value` lines. Blank lines and lines starting with `#` are
    /// skipped; keys not listed are left at their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            config.apply(line).map_err(|error| ConfigError {
                line: idx as u32 + 1,
                error,
            })?;
        }
        Ok(config)
    }

    /// Parse a properties file read as raw bytes.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let text = core::str::from_utf8(bytes).map_err(|_| ConfigError {
            line: 0,
            error: ReramError::FW_CONFIG_NOT_UTF8,
        })?;
        Self::parse(text)
    }

    fn apply(&mut self, line: &str) -> ReramResult<()> {
        let (key, value) = line
            .split_once('=')
            .ok_or(ReramError::FW_CONFIG_MALFORMED_LINE)?;
        let value = value.trim();
        match key.trim() {
            "mode" => {
                self.mode = RunMode::from_key(value).ok_or(ReramError::FW_CONFIG_UNKNOWN_MODE)?
            }
            "device" => {
                self.device = Some(
                    MemoryConfig::by_key(value).ok_or(ReramError::FW_CONFIG_UNKNOWN_DEVICE)?,
                )
            }
            "bits" => {
                let bits = parse_u32(value)?;
                if bits > MAX_BITS {
                    return Err(ReramError::FW_CONFIG_VALUE_OUT_OF_RANGE);
                }
                self.bits = bits;
            }
            "checkpoint" => self.checkpoint = parse_u32(value)?.max(1),
            "tries" => self.tries = Tries::from_signed(parse_i64(value)?),
            "timeout" => self.poll_limit = PollLimit::from_signed_cycles(parse_i64(value)?),
            "seed" => self.seed = parse_u32(value)?,
            "check_interval" => self.check_interval = parse_u32(value)?.max(1),
            "demo_rounds" => {
                self.demo_rounds = match parse_i64(value)? {
                    n if n < 0 => None,
                    n => Some(u32::try_from(n).map_err(|_| ReramError::FW_CONFIG_INVALID_NUMBER)?),
                }
            }
            _ => return Err(ReramError::FW_CONFIG_UNKNOWN_KEY),
        }
        Ok(())
    }
}

fn parse_u32(value: &str) -> ReramResult<u32> {
    value
        .parse()
        .map_err(|_| ReramError::FW_CONFIG_INVALID_NUMBER)
}

fn parse_i64(value: &str) -> ReramResult<i64> {
    value
        .parse()
        .map_err(|_| ReramError::FW_CONFIG_INVALID_NUMBER)
}

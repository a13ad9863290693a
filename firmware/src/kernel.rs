/*++

Licensed under the Apache-2.0 license.

File Name:

    kernel.rs

Abstract:

    File contains the firmware run sequence: self check, storage and
    configuration bring-up, campaign dispatch and stop indication.

--*/

use alloc::vec;

use reram_drivers::{cprintln, Clock, OutputPin, PollLimit, ReramError, SpiBus};
use reram_entropy::{RandomWriteLatency, Tries, VonNeumann};

use crate::campaign::{self, log_error};
use crate::{
    blink, indicate_stop, FwEnv, RunConfig, RunMode, RunStatus, BUILD_TARGET, PARAMS_FILE,
};

/// Pair budget of the start-up extraction.
const DUMMY_TRIES: u32 = 1000;

/// Poll bound of the start-up extraction.
const DUMMY_POLL_CYCLES: u64 = 1000;

/// Largest properties file accepted.
const PARAMS_MAX_SIZE: usize = 4096;

/// Run the firmware once and show the outcome on the LED.
///
/// `stop_blinks` bounds the final blink pattern; the board passes a value
/// large enough to never return in practice.
pub fn run<S: SpiBus, P: OutputPin, C: Clock>(
    env: &mut FwEnv<S, P, C>,
    stop_blinks: u32,
) -> RunStatus {
    let status = run_sequence(env);
    cprintln!(env.log, "[kernel] Run {}", status.name());
    indicate_stop(status, env.led, env.mem.clock_mut(), stop_blinks);
    status
}

fn run_sequence<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    cprintln!(env.log, "[kernel] Build: {}", BUILD_TARGET);
    cprintln!(
        env.log,
        "[kernel] Memory: {}, SPI Frequency: {} Hz",
        env.mem.config().name,
        env.board.spi_frequency()
    );
    cprintln!(
        env.log,
        "[kernel] Write enable GPIO {}, status LED GPIO {}",
        env.board.write_enable_pin,
        env.board.status_led_pin
    );

    // A single bit proves the bus, the write path and the poller work.
    let dummy = {
        let source = RandomWriteLatency::new(
            &mut env.mem,
            &mut env.seed,
            PollLimit::Cycles(DUMMY_POLL_CYCLES),
        );
        let mut vn = VonNeumann::new(source);
        vn.extract_unbiased_bit(Tries::AtMost(DUMMY_TRIES))
            .map(|bit| (bit, vn.raw_bits()))
    };
    match dummy {
        Ok((bit, raw)) => {
            cprintln!(
                env.log,
                "[kernel] Successfully generated bit {} with {} raw bits!",
                u8::from(bit),
                raw
            );
            blink(env.led, env.mem.clock_mut(), 5, 100, 100);
        }
        Err(e) => {
            log_error(env.log, "[kernel] Failed to generate single bit", e);
            return RunStatus::FailedTotally;
        }
    }

    if let Err(e) = env.storage.mount() {
        log_error(env.log, "[kernel] Cannot mount drive", e);
        return RunStatus::FailedTotally;
    }

    let run = match load_params(env) {
        Some(run) => run,
        None => return RunStatus::FailedTotally,
    };
    env.configure(run);

    cprintln!(env.log, "[kernel] Selected mode: {}", run.mode.key());
    match run.mode {
        RunMode::Demo => campaign::run_demo(env),
        RunMode::Trng => campaign::run_trng(env),
        RunMode::Raw => campaign::run_sweep(env),
        RunMode::BurnOut => campaign::run_burnout(env),
        RunMode::SelfTest => campaign::run_selftest(env),
    }
}

/// Read and check the properties file, logging why it was rejected.
fn load_params<S: SpiBus, P: OutputPin, C: Clock>(
    env: &mut FwEnv<S, P, C>,
) -> Option<RunConfig> {
    // One spare byte tells a full file from a truncated one.
    let mut buf = vec![0u8; PARAMS_MAX_SIZE + 1];
    let len = match env.storage.read(PARAMS_FILE, &mut buf) {
        Ok(len) => len,
        Err(e) => {
            log_error(env.log, "[kernel] Cannot read properties", e);
            return None;
        }
    };
    if len > PARAMS_MAX_SIZE {
        cprintln!(
            env.log,
            "[kernel] Properties file {} is larger than {} bytes",
            PARAMS_FILE,
            PARAMS_MAX_SIZE
        );
        log_error(
            env.log,
            "[kernel] Rejected",
            ReramError::FW_CONFIG_FILE_TOO_LARGE,
        );
        return None;
    }

    let run = match RunConfig::parse_bytes(&buf[..len]) {
        Ok(run) => run,
        Err(e) => {
            cprintln!(
                env.log,
                "[kernel] Error loading properties from {} (line {})",
                PARAMS_FILE,
                e.line
            );
            log_error(env.log, "[kernel] Rejected", e.error);
            return None;
        }
    };

    match run.device {
        Some(device) if device != *env.mem.config() => {
            cprintln!(
                env.log,
                "[kernel] Properties are for {}, board has {}",
                device.name,
                env.mem.config().name
            );
            log_error(
                env.log,
                "[kernel] Rejected",
                ReramError::FW_CONFIG_DEVICE_MISMATCH,
            );
            None
        }
        _ => Some(run),
    }
}

/*++

Licensed under the Apache-2.0 license.

File Name:

    bulk.rs

Abstract:

    File contains the bulk random bit generation campaign.

--*/

use alloc::string::String;
use alloc::vec::Vec;

use reram_drivers::{
    cprintln, Clock, LogSink, OutputPin, PollLimit, ReramError, ReramResult, SpiBus, SpiMemory,
};
use reram_entropy::{RandomWriteLatency, SeedSource, Tries, VonNeumann};

use super::log_error;
use crate::{free_artifact_name, ArtifactWriter, FwEnv, RunStatus};

/// Timing of one block of generated bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Checkpoint {
    /// Clock ticks the block took.
    pub ticks: u64,

    /// Raw bits the extractor consumed for the block.
    pub raw_bits: u64,
}

/// Result of [`generate_bits`].
#[derive(Debug, Default)]
pub struct BulkBits {
    /// ASCII `'0'`/`'1'` per extracted bit.
    pub bits: Vec<u8>,

    /// One entry per block, the last one possibly short.
    pub checkpoints: Vec<Checkpoint>,

    pub total_ticks: u64,

    /// Raw bits consumed over the whole run; always even.
    pub raw_bits: u64,

    /// Set when an extraction ran out of tries and generation stopped early.
    pub stopped_by: Option<ReramError>,
}

type Extractor<'m, 'a, S, P, C, G> = VonNeumann<RandomWriteLatency<'m, 'a, S, P, C, G>>;

fn now<S: SpiBus, P: OutputPin, C: Clock, G: SeedSource>(
    vn: &mut Extractor<'_, '_, S, P, C, G>,
) -> u64 {
    vn.source().memory().clock().now_ticks()
}

/// Extract `count` bits, closing a checkpoint every `checkpoint` bits.
///
/// Running out of tries ends generation early with the bits produced so far.
/// Any other measurement error is returned.
#[allow(clippy::too_many_arguments)]
pub fn generate_bits<S: SpiBus, P: OutputPin, C: Clock>(
    mem: &mut SpiMemory<S, P, C>,
    seed: &mut dyn SeedSource,
    limit: PollLimit,
    count: u32,
    checkpoint: u32,
    tries: Tries,
    log: &mut dyn LogSink,
) -> ReramResult<BulkBits> {
    let checkpoint = checkpoint.max(1);
    let mut vn = VonNeumann::new(RandomWriteLatency::new(mem, seed, limit));
    let mut out = BulkBits {
        bits: Vec::with_capacity(count as usize),
        ..Default::default()
    };

    let start = now(&mut vn);
    let mut block_start = start;
    let mut block_raw = 0;
    for i in 0..count {
        if i > 0 && i % checkpoint == 0 {
            let t = now(&mut vn);
            let block = Checkpoint {
                ticks: t - block_start,
                raw_bits: vn.raw_bits() - block_raw,
            };
            cprintln!(log, "[trng] {} us, {}", block.ticks, block.raw_bits);
            out.checkpoints.push(block);
            block_start = t;
            block_raw = vn.raw_bits();
        }

        match vn.extract_unbiased_bit(tries) {
            Ok(bit) => out.bits.push(b'0' + u8::from(bit)),
            Err(e) if e.is_exhausted_tries() => {
                cprintln!(log, "[trng] Bit {} ran out of tries, stopping", i);
                out.stopped_by = Some(e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    let end = now(&mut vn);
    let block = Checkpoint {
        ticks: end - block_start,
        raw_bits: vn.raw_bits() - block_raw,
    };
    cprintln!(log, "[trng] {} us, {}", block.ticks, block.raw_bits);
    out.checkpoints.push(block);

    out.total_ticks = end - start;
    out.raw_bits = vn.raw_bits();
    cprintln!(log, "[trng] Time needed: {} us", out.total_ticks);
    cprintln!(log, "[trng] Total bits generated: {}", out.raw_bits);
    Ok(out)
}

/// Bulk generation campaign: generate the configured number of bits and
/// store them with their timing log.
pub fn run_trng<S: SpiBus, P: OutputPin, C: Clock>(env: &mut FwEnv<S, P, C>) -> RunStatus {
    let device = env.mem.config().short_name;
    let bits_name = match free_artifact_name(env.storage, device, "bits") {
        Ok(name) => name,
        Err(e) => {
            log_error(env.log, "[trng] No free bits file", e);
            return RunStatus::FailedTotally;
        }
    };
    cprintln!(env.log, "[trng] Choosing bits file {}", bits_name.as_str());
    let debug_name = match free_artifact_name(env.storage, device, "debug") {
        Ok(name) => name,
        Err(e) => {
            log_error(env.log, "[trng] No free debug file", e);
            return RunStatus::FailedTotally;
        }
    };
    cprintln!(env.log, "[trng] Choosing debug file {}", debug_name.as_str());

    let run = env.run;
    let out = match generate_bits(
        &mut env.mem,
        &mut env.seed,
        run.poll_limit,
        run.bits,
        run.checkpoint,
        run.tries,
        env.log,
    ) {
        Ok(out) => out,
        Err(e) => {
            log_error(env.log, "[trng] Generation failed", e);
            return RunStatus::FailedTotally;
        }
    };

    let mut status = RunStatus::Okay;
    if out.stopped_by.is_some() {
        status.downgrade(RunStatus::FailedPartially);
    }

    // Bits file
    match ArtifactWriter::create(env.storage, bits_name) {
        Ok(mut file) => {
            file.write_bytes(&out.bits);
            let name = String::from(file.name());
            match file.finish() {
                Ok(()) => cprintln!(
                    env.log,
                    "[trng] Successfully written bits to {}!",
                    name.as_str()
                ),
                Err(e) => {
                    log_error(env.log, "[trng] Cannot write bits file", e);
                    status.downgrade(RunStatus::FailedPartially);
                }
            }
        }
        Err(e) => {
            log_error(env.log, "[trng] Cannot create bits file", e);
            status.downgrade(RunStatus::FailedTotally);
        }
    }

    // Debug file
    match ArtifactWriter::create(env.storage, debug_name) {
        Ok(mut file) => {
            for block in &out.checkpoints {
                let _ = ufmt::uwriteln!(&mut file, "{} us, {}", block.ticks, block.raw_bits);
            }
            let _ = ufmt::uwrite!(
                &mut file,
                "\nTime needed: {} us\nTotal bits generated: {}\n",
                out.total_ticks,
                out.raw_bits
            );
            let name = String::from(file.name());
            match file.finish() {
                Ok(()) => cprintln!(
                    env.log,
                    "[trng] Successfully written debug data to {}!",
                    name.as_str()
                ),
                Err(e) => {
                    log_error(env.log, "[trng] Cannot write debug file", e);
                    status.downgrade(RunStatus::FailedPartially);
                }
            }
        }
        Err(e) => {
            log_error(env.log, "[trng] Cannot create debug file", e);
            status.downgrade(RunStatus::FailedPartially);
        }
    }

    status
}

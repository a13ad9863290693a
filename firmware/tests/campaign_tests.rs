// Licensed under the Apache-2.0 license

mod common;

use common::Bench;
use reram_drivers::{MemoryConfig, PollLimit, SpiMemory};
use reram_entropy::{Mt19937, Tries};
use reram_firmware::campaign::{
    burn_out, generate_bits, is_burnt_out, run_burnout, run_demo, run_selftest, run_trng,
    sweep, test_address, SweepPlan, SweepSummary, PROBE_WRITES,
};
use reram_firmware::{RunConfig, RunStatus};
use reram_hw_model::{new_context, LatencyProfile, LogCapture};

const EVAL: MemoryConfig = MemoryConfig::ADESTO_RM25C512C_EVAL;
const ADESTO: MemoryConfig = MemoryConfig::ADESTO_RM25C512C;
const FUJITSU: MemoryConfig = MemoryConfig::FUJITSU_MB85AS4MT;

const SMALL_SWEEP: SweepPlan = SweepPlan {
    pair_tries: 1,
    full_values: 2,
    full_tries: 1,
};

fn bulk_bits(seed: u32) -> Vec<u8> {
    let mut hw = new_context(EVAL, LatencyProfile::scripted([1, 2, 1, 3]));
    let mut mem = SpiMemory::new(&mut hw, EVAL);
    let mut log = LogCapture::new();
    generate_bits(
        &mut mem,
        &mut Mt19937::new(seed),
        PollLimit::Forever,
        10,
        4,
        Tries::Unbounded,
        &mut log,
    )
    .unwrap()
    .bits
}

#[test]
fn test_bulk_generation_is_reproducible() {
    let first = bulk_bits(5489);
    assert_eq!(first, b"0000000000");
    assert_eq!(first, bulk_bits(5489));
}

#[test]
fn test_bulk_generation_checkpoints() {
    let mut hw = new_context(EVAL, LatencyProfile::jitter(3, 10, 30));
    let mut mem = SpiMemory::new(&mut hw, EVAL);
    let mut log = LogCapture::new();
    let out = generate_bits(
        &mut mem,
        &mut Mt19937::default(),
        PollLimit::Forever,
        10,
        4,
        Tries::Unbounded,
        &mut log,
    )
    .unwrap();

    assert_eq!(out.bits.len(), 10);
    assert!(out.bits.iter().all(|b| *b == b'0' || *b == b'1'));
    // Blocks of 4, 4 and the remaining 2 bits.
    assert_eq!(out.checkpoints.len(), 3);
    assert_eq!(
        out.checkpoints.iter().map(|c| c.ticks).sum::<u64>(),
        out.total_ticks
    );
    assert_eq!(
        out.checkpoints.iter().map(|c| c.raw_bits).sum::<u64>(),
        out.raw_bits
    );
    assert!(out.checkpoints.iter().all(|c| c.raw_bits % 2 == 0));
    assert!(out.raw_bits >= 20);
    assert_eq!(out.stopped_by, None);
    assert!(log.contains("[trng] Total bits generated: "));
}

#[test]
fn test_run_trng_writes_artifacts() {
    let mut bench = Bench::new(EVAL, LatencyProfile::jitter(9, 10, 30));
    bench.mount();
    bench.fs.insert("Adesto_0_bits.log", "taken");
    let status = run_trng(&mut bench.env_with(RunConfig {
        bits: 16,
        checkpoint: 4,
        ..Default::default()
    }));
    assert_eq!(status, RunStatus::Okay);

    let bits = bench.fs.text("Adesto_1_bits.log");
    assert_eq!(bits.len(), 16);
    assert!(bits.chars().all(|c| c == '0' || c == '1'));

    let debug = bench.fs.text("Adesto_0_debug.log");
    let lines: Vec<&str> = debug.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[..4].iter().all(|l| l.contains(" us, ")));
    assert_eq!(lines[4], "");
    assert!(lines[5].starts_with("Time needed: "));
    assert!(lines[6].starts_with("Total bits generated: "));
    assert!(bench
        .log
        .contains("Successfully written bits to Adesto_1_bits.log!"));
}

#[test]
fn test_run_trng_out_of_tries_keeps_partial_output() {
    let mut bench = Bench::new(EVAL, LatencyProfile::Fixed(4));
    bench.mount();
    let status = run_trng(&mut bench.env_with(RunConfig {
        bits: 16,
        tries: Tries::AtMost(5),
        ..Default::default()
    }));
    assert_eq!(status, RunStatus::FailedPartially);
    assert_eq!(bench.fs.text("Adesto_0_bits.log"), "");
    assert!(bench.fs.text("Adesto_0_debug.log").contains("Total bits generated: 10"));
}

#[test]
fn test_run_trng_storage_failures() {
    use reram_hw_model::StorageFault;

    let mut bench = Bench::new(EVAL, LatencyProfile::jitter(9, 10, 30));
    bench.mount();
    bench.fs.inject(StorageFault::Append);
    let run = RunConfig {
        bits: 8,
        ..Default::default()
    };
    assert_eq!(
        run_trng(&mut bench.env_with(run)),
        RunStatus::FailedPartially
    );

    let mut bench = Bench::new(EVAL, LatencyProfile::jitter(9, 10, 30));
    bench.mount();
    bench.fs.inject(StorageFault::Create);
    assert_eq!(run_trng(&mut bench.env_with(run)), RunStatus::FailedTotally);
    assert!(bench.log.contains("[trng] Cannot create bits file"));
}

#[test]
fn test_is_burnt_out() {
    let mut hw = new_context(ADESTO, LatencyProfile::Fixed(2));
    hw.spi.stick(9022);
    let mut mem = SpiMemory::new(&mut hw, ADESTO);
    let mut rng = Mt19937::default();

    // The first probe value is 0x5C, the stuck cell holds 0.
    assert!(is_burnt_out(&mut mem, &mut rng, 9022, PROBE_WRITES, PollLimit::Forever).unwrap());
    assert!(!is_burnt_out(&mut mem, &mut rng, 3609, PROBE_WRITES, PollLimit::Forever).unwrap());
    assert_eq!(hw.spi.committed_writes(), 1 + 10);
}

#[test]
fn test_burn_out_until_stuck() {
    let mut bench = Bench::worn(ADESTO, LatencyProfile::Fixed(2), 25);
    let mut mem = SpiMemory::new(&mut bench.hw, ADESTO);
    let writes = burn_out(&mut mem, &mut bench.rng, 44054, 10, PollLimit::Forever).unwrap();
    assert!(writes >= 1);
    assert!(bench.hw.spi.is_stuck(44054));
    assert!(!bench.hw.spi.is_stuck(44055));
}

#[test]
fn test_burn_out_propagates_timeout() {
    let mut hw = new_context(ADESTO, LatencyProfile::NeverIdle);
    let mut mem = SpiMemory::new(&mut hw, ADESTO);
    let err = burn_out(&mut mem, &mut Mt19937::default(), 1, 10, PollLimit::Cycles(8)).unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn test_run_burnout() {
    let mut bench = Bench::worn(ADESTO, LatencyProfile::Fixed(2), 30);
    bench.mount();
    assert_eq!(run_burnout(&mut bench.env()), RunStatus::Okay);
    assert!(bench.log.contains("[burnout] Cell 3609 sane"));
    assert!(bench.log.contains("[burnout] Cell 64198 burnt out"));
    assert!(bench.log.contains("[burnout] Burn out process complete"));
    for cell in [1, 9022, 26978, 44054, 60772, 6, 10990, 31987, 54833, 64198] {
        assert!(bench.hw.spi.is_stuck(cell), "cell {cell}");
    }
    assert!(!bench.hw.spi.is_stuck(3609));
}

#[test]
fn test_run_burnout_rejects_fujitsu() {
    let mut bench = Bench::new(FUJITSU, LatencyProfile::Fixed(2));
    bench.mount();
    assert_eq!(run_burnout(&mut bench.env()), RunStatus::FailedTotally);
    assert_eq!(bench.hw.spi.committed_writes(), 0);
}

#[test]
fn test_sweep_artifact() {
    let mut bench = Bench::worn(ADESTO, LatencyProfile::Fixed(3), 20);
    bench.mount();
    let summary = sweep(&mut bench.env(), &SMALL_SWEEP).unwrap();
    assert_eq!(
        summary,
        SweepSummary {
            samples: 140,
            timeouts: 0
        }
    );

    let text = bench.fs.text("Adesto_0_measure.log");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 140);
    assert_eq!(lines[0], "B,1,0,255,3");
    assert_eq!(lines[49], "B,60772,76,216,3");
    assert_eq!(lines[50], "S,3609,0,255,3");
    assert_eq!(lines[100], "B,6,0,0,3");
    assert_eq!(lines[120], "S,7541,0,0,3");
    assert_eq!(lines[139], "S,60456,1,1,3");
    assert!(bench.log.contains("[sweep] Burnt done"));
    assert!(bench.log.contains("[sweep] Sane full done"));
}

#[test]
fn test_sweep_skips_burnt_cells_on_fujitsu() {
    let mut bench = Bench::new(FUJITSU, LatencyProfile::Fixed(2));
    bench.mount();
    let summary = sweep(&mut bench.env(), &SMALL_SWEEP).unwrap();
    assert_eq!(summary.samples, 70);
    let text = bench.fs.text("Fujitsu_0_measure.log");
    assert!(text.lines().all(|l| l.starts_with("S,")));
    assert!(!bench.log.contains("Burnt done"));
}

#[test]
fn test_sweep_counts_timeouts() {
    let mut bench = Bench::new(FUJITSU, LatencyProfile::NeverIdle);
    bench.mount();
    let run = RunConfig {
        poll_limit: PollLimit::Cycles(2),
        ..Default::default()
    };
    let summary = sweep(&mut bench.env_with(run), &SMALL_SWEEP).unwrap();
    assert_eq!(
        summary,
        SweepSummary {
            samples: 0,
            timeouts: 70
        }
    );
    assert_eq!(bench.fs.text("Fujitsu_0_measure.log"), "");
}

#[test]
fn test_sweep_on_eval_part_skips_missing_cells() {
    let mut bench = Bench::worn(EVAL, LatencyProfile::Fixed(2), 20);
    bench.mount();
    let summary = sweep(&mut bench.env(), &SMALL_SWEEP).unwrap();
    // Only cells 1 and 6 exist on the evaluation part.
    assert_eq!(summary.samples, 10 + 4);
    assert!(bench
        .log
        .contains("Cell 3609 outside of 512 byte part, skipped"));
}

#[test]
fn test_demo_rounds() {
    let mut bench = Bench::new(EVAL, LatencyProfile::Fixed(2));
    let status = run_demo(&mut bench.env_with(RunConfig {
        demo_rounds: Some(3),
        ..Default::default()
    }));
    assert_eq!(status, RunStatus::Okay);
    assert_eq!(bench.log.lines().filter(|l| l.starts_with("[demo] Bit 0")).count(), 3);
    assert!(bench.hw.clock.peek() >= 3 * 5_000_000);
}

#[test]
fn test_demo_stops_on_failed_measurement() {
    let mut bench = Bench::new(EVAL, LatencyProfile::NeverIdle);
    let status = run_demo(&mut bench.env_with(RunConfig {
        poll_limit: PollLimit::Cycles(5),
        ..Default::default()
    }));
    assert_eq!(status, RunStatus::FailedTotally);
    assert!(bench.log.contains("[demo] Measurement failed"));
}

#[test]
fn test_address_reports_mismatch() {
    let mut hw = new_context(EVAL, LatencyProfile::Fixed(1));
    hw.spi.stick(7);
    let mut mem = SpiMemory::new(&mut hw, EVAL);
    let mut log = LogCapture::new();
    let mut rng = Mt19937::default();
    assert!(!test_address(&mut mem, &mut rng, 7, PollLimit::Forever, &mut log).unwrap());
    assert_eq!(log.peek(), "[selftest] 7: 0x5C -> 0x00\n");
    assert!(test_address(&mut mem, &mut rng, 8, PollLimit::Forever, &mut log).unwrap());
}

#[test]
fn test_run_selftest() {
    let mut bench = Bench::new(EVAL, LatencyProfile::Fixed(1));
    assert_eq!(run_selftest(&mut bench.env()), RunStatus::Okay);
    assert!(bench.log.contains("[selftest] All 512 cells passed"));

    let mut bench = Bench::new(EVAL, LatencyProfile::Fixed(1));
    for cell in [100, 200, 300] {
        bench.hw.spi.stick(cell);
    }
    assert_eq!(run_selftest(&mut bench.env()), RunStatus::FailedPartially);
    assert!(bench.log.contains("cells failed"));
}

/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the ReRAM board emulator. Runs the
    firmware against the software chip model with a host directory as SD
    card.

--*/

use clap::{arg, value_parser};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use reram_drivers::{BoardConfig, HwContext, MemoryConfig, SpiMemory};
use reram_entropy::SeedSource;
use reram_firmware::{run, FwEnv, RunStatus};
use reram_hw_model::{LatencyProfile, LogCapture, RecordingPin, ReramModel, SimClock};
use std::io;
use std::path::PathBuf;
use std::process::exit;

mod sd_card;

use sd_card::SdCard;

/// Stand-in for the board's hardware random number generator.
struct HostRng(StdRng);

impl SeedSource for HostRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Okay => 0,
        RunStatus::FailedPartially => 1,
        RunStatus::FailedTotally => 2,
    }
}

fn main() -> io::Result<()> {
    let args = clap::Command::new("reram-emu")
        .about("ReRAM entropy board emulator")
        .arg(
            arg!(--sd-card <DIR> "Directory used as SD card; holds params.properties")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--device <NAME> "Memory part: adesto, adesto-eval or fujitsu")
                .required(false)
                .default_value("adesto"),
        )
        .arg(
            arg!(--latency-min <CYCLES> "Shortest simulated write latency")
                .required(false)
                .default_value("20")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(--latency-max <CYCLES> "Longest simulated write latency")
                .required(false)
                .default_value("60")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(--latency-seed <SEED> "Seed of the simulated latency jitter")
                .required(false)
                .default_value("0")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(--endurance <WRITES> "Writes after which a cell gets stuck")
                .required(false)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(--stop-blinks <COUNT> "Blinks of the final LED pattern")
                .required(false)
                .default_value("3")
                .value_parser(value_parser!(u32)),
        )
        .get_matches();

    let sd_card = args.get_one::<PathBuf>("sd-card").unwrap();
    let device = args.get_one::<String>("device").unwrap();
    let latency_min = *args.get_one::<u64>("latency-min").unwrap();
    let latency_max = *args.get_one::<u64>("latency-max").unwrap();
    let latency_seed = *args.get_one::<u64>("latency-seed").unwrap();
    let stop_blinks = *args.get_one::<u32>("stop-blinks").unwrap();

    let Some(part) = MemoryConfig::by_key(device) else {
        println!("Unknown device {device:?}");
        exit(-1);
    };
    if latency_min == 0 || latency_max < latency_min {
        println!("Latency range {latency_min}..={latency_max} is empty");
        exit(-1);
    }
    sd_card::prepare(sd_card)?;

    let clock = SimClock::default();
    let mut chip = ReramModel::new(
        part,
        LatencyProfile::jitter(latency_seed, latency_min, latency_max),
    )
    .with_clock(clock.clone(), 1);
    if let Some(writes) = args.get_one::<u32>("endurance") {
        chip = chip.with_endurance(*writes);
    }

    let board = BoardConfig::DEFAULT;
    let mut hw = HwContext::new(chip, RecordingPin::default(), clock.clone(), board.chip_select);
    let mut led = RecordingPin::default();
    let mut card = SdCard::new(sd_card.clone());
    let mut log = LogCapture::with_echo(io::stdout(), clock);
    let mut hw_rng = HostRng(StdRng::from_entropy());

    let mut env = FwEnv::new(
        SpiMemory::new(&mut hw, part),
        &mut led,
        &mut card,
        &mut log,
        &mut hw_rng,
        board,
    );
    let status = run(&mut env, stop_blinks);
    println!(
        "{} writes committed, {} status reads",
        hw.spi.committed_writes(),
        hw.spi.status_reads()
    );
    exit(exit_code(status));
}

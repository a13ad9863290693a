// Licensed under the Apache-2.0 license

use reram_drivers::{MemoryConfig, PollLimit, ReramError, SpiMemory};
use reram_entropy::{
    measure_bulk_write_latency, measure_latency_bit, measure_write_latency, LatencySource,
    Mt19937, RandomWriteLatency, SeedSource, Tries, VonNeumann,
};
use reram_hw_model::{new_context, LatencyProfile};

const PART: MemoryConfig = MemoryConfig::ADESTO_RM25C512C_EVAL;

#[test]
fn test_first_write_latency_is_discarded() {
    let mut hw = new_context(PART, LatencyProfile::scripted([9, 4]));
    let mut mem = SpiMemory::new(&mut hw, PART);
    assert_eq!(
        measure_write_latency(&mut mem, 17, 0x00, 0xFF, PollLimit::Forever).unwrap(),
        4
    );
    assert_eq!(mem.read_byte(17).unwrap(), 0xFF);
    assert_eq!(hw.spi.committed_writes(), 2);
}

#[test]
fn test_latency_bit_is_lsb_of_second_sample() {
    for (script, expected) in [([2u64, 7u64], true), ([7, 2], false), ([1, 1], true)] {
        let mut hw = new_context(PART, LatencyProfile::scripted(script));
        let mut mem = SpiMemory::new(&mut hw, PART);
        assert_eq!(
            measure_latency_bit(&mut mem, 0, 0xAA, 0x55, PollLimit::Cycles(100)).unwrap(),
            expected
        );
    }
}

#[test]
fn test_measurement_timeout() {
    let mut hw = new_context(PART, LatencyProfile::NeverIdle);
    let mut mem = SpiMemory::new(&mut hw, PART);
    let err = measure_write_latency(&mut mem, 0, 1, 2, PollLimit::Cycles(1000)).unwrap_err();
    assert!(err.is_timeout());
    // The second write never went out.
    assert_eq!(hw.spi.committed_writes(), 1);
}

#[test]
fn test_bulk_write_latency() {
    let mut hw = new_context(MemoryConfig::ADESTO_RM25C512C, LatencyProfile::scripted([3, 6]));
    let mut mem = SpiMemory::new(&mut hw, MemoryConfig::ADESTO_RM25C512C);
    assert_eq!(
        measure_bulk_write_latency(&mut mem, 0x200, 64, 0x0F, 0xF0, PollLimit::Forever).unwrap(),
        6
    );
    assert_eq!(mem.read_byte(0x23F).unwrap(), 0xF0);
    assert_eq!(
        measure_bulk_write_latency(&mut mem, 0, 257, 0, 0, PollLimit::Forever),
        Err(ReramError::DRIVER_RERAM_BULK_WRITE_TOO_LARGE)
    );
}

#[test]
fn test_random_write_latency_follows_seed() {
    let mut hw = new_context(PART, LatencyProfile::Fixed(5));
    let mut mem = SpiMemory::new(&mut hw, PART);
    let mut source = RandomWriteLatency::new(&mut mem, Mt19937::new(7), PollLimit::Forever);
    let sample = source.sample().unwrap();

    let mut expected = Mt19937::new(7);
    assert_eq!(sample.address, expected.range(0, PART.capacity).unwrap());
    assert_eq!(sample.first, expected.range(0, 256).unwrap() as u8);
    assert_eq!(sample.second, expected.range(0, 256).unwrap() as u8);
    assert_eq!(sample.cycles, 5);
    assert!(sample.bit());
    assert_eq!(
        source.memory().read_byte(sample.address).unwrap(),
        sample.second
    );
}

#[test]
fn test_extractor_over_alternating_latency() {
    // Per sample the first write takes 1 cycle, the second alternates 2, 3.
    let mut hw = new_context(PART, LatencyProfile::scripted([1, 2, 1, 3]));
    let mut mem = SpiMemory::new(&mut hw, PART);
    let source = RandomWriteLatency::new(&mut mem, Mt19937::default(), PollLimit::Forever);
    let mut vn = VonNeumann::new(source);

    for _ in 0..10 {
        assert!(!vn.extract_unbiased_bit(Tries::AtMost(1)).unwrap());
    }
    assert_eq!(vn.raw_bits(), 20);
}

#[test]
fn test_extractor_constant_latency_exhausts() {
    let mut hw = new_context(PART, LatencyProfile::Fixed(4));
    let mut mem = SpiMemory::new(&mut hw, PART);
    let source = RandomWriteLatency::new(&mut mem, Mt19937::default(), PollLimit::Forever);
    let mut vn = VonNeumann::new(source);
    assert_eq!(
        vn.extract_unbiased_bit(Tries::AtMost(50)),
        Err(ReramError::ENTROPY_VON_NEUMANN_EXHAUSTED_TRIES)
    );
    assert_eq!(vn.raw_bits(), 100);
}

#[test]
fn test_extractor_counts_timeouts_as_tries() {
    let mut hw = new_context(PART, LatencyProfile::NeverIdle);
    let mut mem = SpiMemory::new(&mut hw, PART);
    let source = RandomWriteLatency::new(&mut mem, Mt19937::default(), PollLimit::Cycles(3));
    let mut vn = VonNeumann::new(source);
    assert!(vn
        .extract_unbiased_bit(Tries::AtMost(4))
        .unwrap_err()
        .is_exhausted_tries());
    assert_eq!(vn.raw_bits(), 0);
}

#[test]
fn test_jittery_part_yields_both_values() {
    let mut hw = new_context(PART, LatencyProfile::jitter(1, 20, 40));
    let mut mem = SpiMemory::new(&mut hw, PART);
    let source = RandomWriteLatency::new(&mut mem, Mt19937::default(), PollLimit::Forever);
    let mut vn = VonNeumann::new(source);

    let mut ones = 0;
    for _ in 0..200 {
        if vn.extract_unbiased_bit(Tries::Unbounded).unwrap() {
            ones += 1;
        }
    }
    assert!(ones > 50 && ones < 150, "ones={ones}");
    assert!(vn.source().next_raw_bit().is_ok());
}

//! # Memory Power Tests

use std::fs;

use serde_json::json;
use stackbridge_core::trace::{MemPowerInputs, MemoryEnergy, write_mem_power_trace};
use stackbridge_core::{BridgeError, ConfigStore, StatsStore};

use crate::common::init_tracing;

/// CACTI header plus a result row whose columns 8, 9 and 10 hold the energies.
const CACTI: &str = "\
Tech node (nm), Capacity (bytes), Number of banks, Associativity, Output width (bits), Access time (ns), Random cycle time (ns), Multisubbank interleave cycle time (ns), Dynamic read energy (nJ), Dynamic write energy (nJ), Standby leakage per bank(mW)
32, 1073741824, 2, 1, 64, 10.5, 20.1, 2.5, 0.5, 0.25, 0.1
";

fn dram_config() -> ConfigStore {
    ConfigStore::from_value(json!({
        "system": { "mem_ctrls": [{ "dram": {
            "banks_per_rank": 2,
            "ranks_per_channel": 1,
            "burst_length": 8
        }}]}
    }))
}

const STATS: &str = "\
simSeconds 0.000001
system.mem_ctrls.dram.perBankRdBursts::0 1000
system.mem_ctrls.dram.perBankRdBursts::1 500
system.mem_ctrls.dram.perBankWrBursts::0 200
system.mem_ctrls.dram.perBankWrBursts::1 0
";

fn energy() -> MemoryEnergy {
    MemoryEnergy::parse(CACTI).unwrap()
}

#[test]
fn test_parse_cacti_energies() {
    assert_eq!(
        energy(),
        MemoryEnergy {
            read: 0.5,
            write: 0.25,
            leakage: 0.1,
        }
    );
}

#[test]
fn test_cacti_without_result_row_is_fatal() {
    assert!(matches!(MemoryEnergy::parse("header only\n"), Err(BridgeError::Cacti(_))));
}

#[test]
fn test_cacti_short_or_non_numeric_row_is_fatal() {
    assert!(matches!(MemoryEnergy::parse("h\n1, 2, 3\n"), Err(BridgeError::Cacti(_))));
    assert!(matches!(
        MemoryEnergy::parse("h\n0,1,2,3,4,5,6,7,x,0.2,0.1\n"),
        Err(BridgeError::Cacti(_))
    ));
}

#[test]
fn test_bank_powers() {
    let inputs = MemPowerInputs::gather(&dram_config(), &StatsStore::parse(STATS), energy()).unwrap();
    assert_eq!(inputs.num_banks(), 2);
    assert_eq!(inputs.read_bursts, vec![1000, 500]);
    assert_eq!(inputs.write_bursts, vec![200, 0]);
    assert!((inputs.interval_ns - 1000.0).abs() < 1e-9);
    assert_eq!(inputs.bank_powers(), vec![4.5, 2.1]);
    assert_eq!(inputs.render(), "B_0\tB_1\t\n4.5\t2.1\t");
}

#[test]
fn test_extra_bank_counters_are_ignored() {
    init_tracing();
    let stats = format!("{STATS}system.mem_ctrls.dram.perBankRdBursts::2 9999\n");
    let inputs = MemPowerInputs::gather(&dram_config(), &StatsStore::parse(&stats), energy()).unwrap();
    assert_eq!(inputs.read_bursts, vec![1000, 500]);
}

#[test]
fn test_missing_counters_leave_banks_idle() {
    let inputs = MemPowerInputs::gather(&dram_config(), &StatsStore::parse("simSeconds 0.000001\n"), energy()).unwrap();
    assert_eq!(inputs.bank_powers(), vec![0.1, 0.1]);
}

#[test]
fn test_exact_ties_round_to_even() {
    let config = ConfigStore::from_value(json!({
        "system": { "mem_ctrls": [{ "dram": {
            "banks_per_rank": 1,
            "ranks_per_channel": 1,
            "burst_length": 8
        }}]}
    }));
    let leakage = |value: &str| {
        let cacti = format!("header\n32, 1073741824, 2, 1, 64, 10.5, 20.1, 2.5, 0.5, 0.25, {value}\n");
        let energy = MemoryEnergy::parse(&cacti).unwrap();
        MemPowerInputs::gather(&config, &StatsStore::parse("simSeconds 0.000001\n"), energy).unwrap()
    };

    assert_eq!(leakage("0.0625").render(), "B_0\t\n0.062\t");
    assert_eq!(leakage("0.0626").bank_powers(), vec![0.063]);
}

#[test]
fn test_missing_or_zero_interval_is_fatal() {
    let missing = StatsStore::parse("system.mem_ctrls.dram.perBankRdBursts::0 1\n");
    assert!(matches!(
        MemPowerInputs::gather(&dram_config(), &missing, energy()),
        Err(BridgeError::MemoryStats(_))
    ));

    let zero = StatsStore::parse("simSeconds 0\n");
    assert!(matches!(
        MemPowerInputs::gather(&dram_config(), &zero, energy()),
        Err(BridgeError::MemoryStats(_))
    ));
}

#[test]
fn test_missing_dram_geometry_is_fatal() {
    let config = ConfigStore::from_value(json!({ "system": { "mem_ctrls": [] } }));
    assert!(matches!(
        MemPowerInputs::gather(&config, &StatsStore::parse(STATS), energy()),
        Err(BridgeError::MissingSection { .. })
    ));
}

#[test]
fn test_write_mem_power_trace() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let stats_path = dir.path().join("stats.txt");
    let cacti_path = dir.path().join("cacti.out");
    let output_path = dir.path().join("mem_power_trace.txt");

    let config = json!({
        "system": { "mem_ctrls": [{ "dram": {
            "banks_per_rank": 2, "ranks_per_channel": 1, "burst_length": 8
        }}]}
    });
    fs::write(&config_path, config.to_string()).unwrap();
    fs::write(&stats_path, STATS).unwrap();
    fs::write(&cacti_path, CACTI).unwrap();

    write_mem_power_trace(&config_path, &stats_path, &cacti_path, &output_path).unwrap();
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "B_0\tB_1\t\n4.5\t2.1\t");
}

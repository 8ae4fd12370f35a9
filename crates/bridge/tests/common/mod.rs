//! # Test Fixtures
//!
//! gem5-shaped inputs shared by the unit tests. Every number here is chosen so the
//! expected derived values can be worked out by hand in the tests.

use serde_json::{Value, json};
use stackbridge_core::{ConfigStore, StatsStore, Template};

/// How the L2 is laid out in a fixture configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L2Setup {
    /// No L2 key anywhere.
    None,
    /// An `l2` key under every core.
    Private,
    /// A single `system.l2`.
    Shared,
}

/// Installs a test subscriber so warnings show up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// One x86 out-of-order core.
///
/// Front-end delays sum to 8 and the longest commit feedback delay is 6, so the
/// pipeline depth is `2 + 8 + 8, 8 + 8 + 8` = `18,24`.
pub fn cpu_config() -> Value {
    json!({
        "type": "DerivO3CPU",
        "isa": [{ "type": "X86ISA" }],
        "issueWidth": 8,
        "fetchWidth": 4,
        "decodeWidth": 4,
        "commitWidth": 8,
        "numThreads": 1,
        "fetchToDecodeDelay": 3,
        "decodeToRenameDelay": 2,
        "renameToIEWDelay": 1,
        "iewToCommitDelay": 2,
        "commitToDecodeDelay": 5,
        "commitToFetchDelay": 4,
        "commitToIEWDelay": 6,
        "commitToRenameDelay": 3,
        "numROBEntries": 192,
        "numPhysIntRegs": 256,
        "numPhysFloatRegs": 128,
        "SQEntries": 32,
        "LQEntries": 48,
        "fetchBufferSize": 64,
        "numIQEntries": 64,
        "branchPred": {
            "RASSize": 16,
            "localPredictorSize": 2048,
            "localCtrBits": 2,
            "localHistoryTableSize": 2048,
            "globalPredictorSize": 8192,
            "globalCtrBits": 2,
            "choicePredictorSize": 8192,
            "choiceCtrBits": 2,
            "BTBEntries": 4096,
            "BTBTagSize": 16,
            "indirectBranchPred": { "indirectWays": 2 }
        },
        "mmu": {
            "itb": { "size": 64 },
            "dtb": { "size": 96 }
        },
        "icache": {
            "size": 32768,
            "assoc": 8,
            "tags": { "block_size": 64 },
            "response_latency": 2,
            "mshrs": 4
        },
        "dcache": {
            "size": 65536,
            "assoc": 8,
            "tags": { "block_size": 64 },
            "response_latency": 2,
            "mshrs": 20
        },
        "fuPool": {
            "FUList": [
                { "count": 6, "opList": [{ "opClass": "IntAlu", "opLat": 1, "pipelined": true }] },
                {
                    "count": 2,
                    "opList": [
                        { "opClass": "IntMult", "opLat": 3, "pipelined": true },
                        { "opClass": "IntDiv", "opLat": 20, "pipelined": false }
                    ]
                },
                {
                    "count": 4,
                    "opList": [
                        { "opClass": "FloatAdd", "opLat": 2, "pipelined": true },
                        { "opClass": "FloatCmp", "opLat": 2, "pipelined": true }
                    ]
                },
                {
                    "count": 4,
                    "opList": [
                        { "opClass": "MemRead", "opLat": 1, "pipelined": true },
                        { "opClass": "MemWrite", "opLat": 1, "pipelined": true }
                    ]
                }
            ]
        }
    })
}

/// Shared L2 parameters.
pub fn l2_config() -> Value {
    json!({
        "size": 1_048_576,
        "assoc": 16,
        "tags": { "block_size": 64 },
        "response_latency": 20,
        "mshrs": 32
    })
}

/// A full configuration document as JSON.
///
/// Core clock period 500 ps (2000 MHz), memory clocked from `system.clk_domain`,
/// one memory controller with 2 ranks of 8 banks.
pub fn config_value(cores: usize, l2: L2Setup) -> Value {
    let cpus: Vec<Value> = (0..cores)
        .map(|_| {
            let mut cpu = cpu_config();
            if l2 == L2Setup::Private {
                cpu["l2"] = l2_config();
            }
            cpu
        })
        .collect();

    let mut system = json!({
        "cpu": cpus,
        "cpu_clk_domain": { "clock": [500] },
        "cpu_voltage_domain": { "voltage": [1.0] },
        "voltage_domain": { "voltage": [0.9] },
        "clk_domain": { "clock": [1000] },
        "mem_ctrls": [{
            "dram": {
                "clk_domain": "system.clk_domain",
                "write_buffer_size": 64,
                "ranks_per_channel": 2,
                "banks_per_rank": 8,
                "burst_length": 8
            }
        }]
    });
    if l2 == L2Setup::Shared {
        system["l2"] = l2_config();
    }
    json!({ "system": system })
}

/// A configuration store built from [`config_value`].
pub fn config(cores: usize, l2: L2Setup) -> ConfigStore {
    ConfigStore::from_value(config_value(cores, l2))
}

/// Counters of one core, each line prefixed with `prefix` (`system.cpu` or `system.cpu<i>`).
///
/// `multi` switches the TLB counters to the read/write split gem5 uses for
/// multi-core runs.
pub fn core_stats(prefix: &str, cycles: i64, idle: i64, multi: bool) -> String {
    let mut lines = vec![
        format!("numCycles {cycles}"),
        format!("idleCycles {idle}"),
        "commitStats0.numInsts 1500".to_owned(),
        "commitStats0.numIntInsts 1000".to_owned(),
        "commitStats0.numFpInsts 100".to_owned(),
        "commitStats0.numLoadInsts 300".to_owned(),
        "commitStats0.numStoreInsts 100".to_owned(),
        "branchPred.condPredicted 200".to_owned(),
        "branchPred.condIncorrect 20".to_owned(),
        "branchPred.lookups 400".to_owned(),
        "branchPred.BTBLookups 150".to_owned(),
        "branchPred.BTBHits 120".to_owned(),
        "commit.numCommittedDist::total 1500".to_owned(),
        "commit.functionCalls 10".to_owned(),
        "rob.reads 3000".to_owned(),
        "rob.writes 2500".to_owned(),
        "executeStats0.numIntRegReads 2000".to_owned(),
        "executeStats0.numFpRegReads 50".to_owned(),
        "executeStats0.numIntRegWrites 1800".to_owned(),
        "executeStats0.numFpRegWrites 40".to_owned(),
        "intAluAccesses 1200".to_owned(),
        "fpAluAccesses 80".to_owned(),
        "statIssuedInstType_0::IntMult 30".to_owned(),
        "statIssuedInstType_0::IntDiv 5".to_owned(),
        "rename.intLookups 600".to_owned(),
        "rename.fpLookups 200".to_owned(),
        "rename.lookups 800".to_owned(),
        "rename.renamedOperands 1600".to_owned(),
        "intInstQueueReads 900".to_owned(),
        "intInstQueueWrites 850".to_owned(),
        "intInstQueueWakeupAccesses 700".to_owned(),
        "fpInstQueueReads 90".to_owned(),
        "fpInstQueueWrites 85".to_owned(),
        "fpInstQueueWakeupAccesses 70".to_owned(),
        "icache.ReadReq.accesses::total 700".to_owned(),
        "icache.ReadReq.misses::total 14".to_owned(),
        "icache.overallAccesses::total 700".to_owned(),
        "dcache.ReadReq.accesses::total 300".to_owned(),
        "dcache.ReadReq.misses::total 6".to_owned(),
        "dcache.WriteReq.accesses::total 100".to_owned(),
        "dcache.WriteReq.misses::total 2".to_owned(),
        "dcache.overallAccesses::total 400".to_owned(),
    ];
    if multi {
        lines.extend(
            [
                "mmu.itb.rdAccesses 700",
                "mmu.itb.wrAccesses 0",
                "mmu.itb.rdMisses 7",
                "mmu.itb.wrMisses 0",
                "mmu.dtb.rdAccesses 300",
                "mmu.dtb.wrAccesses 100",
                "mmu.dtb.rdMisses 3",
                "mmu.dtb.wrMisses 1",
            ]
            .map(str::to_owned),
        );
    } else {
        lines.extend(
            [
                "mmu.itb.accesses 700",
                "mmu.itb.misses 7",
                "mmu.dtb.accesses 400",
                "mmu.dtb.misses 4",
            ]
            .map(str::to_owned),
        );
    }

    lines
        .iter()
        .map(|line| format!("{prefix}.{line}\n"))
        .collect()
}

/// System, L2 and memory controller counters.
pub fn system_stats() -> String {
    "\
simSeconds 0.001000
simTicks 1000000000
system.clk_domain.clock 1000
system.l2.overallAccesses::total 500
system.l2.ReadSharedReq.accesses::total 100
system.l2.ReadExReq.accesses::total 50
system.l2.ReadSharedReq.misses::total 10
system.l2.ReadExReq.misses::total 5
system.l2.UpgradeReq.accesses::total 10
system.l2.WritebackDirty.accesses::total 40
system.l2.WritebackDirty.misses::total 4
system.l2.tags.tagAccesses 2500
system.mem_ctrls.readReqs 800
system.mem_ctrls.writeReqs 200
"
    .to_owned()
}

/// A one-core dump. `prefix` is `system.cpu` (gem5's one-core naming) or `system.cpu0`.
pub fn single_core_stats(prefix: &str) -> StatsStore {
    let text = format!(
        "---------- Begin Simulation Statistics ----------\n{}{}\n---------- End Simulation Statistics   ----------\n",
        system_stats(),
        core_stats(prefix, 1000, 200, false)
    );
    StatsStore::parse(&text)
}

/// A two-core dump: core 0 runs 1000 cycles (200 idle), core 1 runs 2000 (500 idle).
pub fn dual_core_stats() -> StatsStore {
    let text = format!(
        "{}{}{}system.l2.overallAccesses::cpu0.inst 100\nsystem.l2.overallAccesses::cpu0.data 150\nsystem.l2.overallAccesses::cpu1.inst 200\nsystem.l2.overallAccesses::cpu1.data 300\n",
        system_stats(),
        core_stats("system.cpu0", 1000, 200, true),
        core_stats("system.cpu1", 2000, 500, true)
    );
    StatsStore::parse(&text)
}

/// A template with one field of each kind under the system and a full core component.
pub const CORE_TEMPLATE: &str = r#"<component id="root" name="root">
	<component id="system" name="system">
		<param name="number_of_cores" value="4"/>
		<param name="number_of_L2s" value="0"/>
		<param name="Private_L2" value="1"/>
		<param name="target_core_clockrate" value="%i"/>
		<param name="core_tech_node" value="45"/>
		<stat name="total_cycles" value="%i"/>
		<stat name="idle_cycles" value="%i"/>
		<stat name="busy_cycles" value="%i"/>
		<component id="system.core" name="core">
			<!-- Core property -->
			<param name="clock_rate" value="%i"/>
			<param name="vdd" value="%f"/>
			<param name="machine_type" value="%i"/>
			<param name="x86" value="0"/>
			<param name="pipeline_depth" value="%i,%i"/>
			<param name="issue_width" value="%u"/>
			<param name="instruction_window_size" value="%i"/>
			<param name="ALU_per_core" value="%i"/>
			<param name="MUL_per_core" value="%i"/>
			<param name="FPU_per_core" value="%i"/>
			<param name="opt_local" value="1"/>
			<stat name="total_cycles" value="%i"/>
			<stat name="idle_cycles" value="%i"/>
			<stat name="busy_cycles" value="%i"/>
			<stat name="rename_writes" value="%i"/>
			<stat name="fp_rename_writes" value="%i"/>
			<stat name="mul_accesses" value="%i"/>
			<stat name="ALU_duty_cycle" value="1"/>
			<stat name="MUL_duty_cycle" value="0.3"/>
			<stat name="committed_int_instructions" value="stats.system.cpu.commitStats0.numIntInsts"/>
			<component id="system.core.predictor" name="PBT">
				<param name="local_predictor_size" value="10,3"/>
				<param name="global_predictor_size" value="4096"/>
			</component>
			<component id="system.core.itlb" name="itlb">
				<param name="number_entries" value="128"/>
				<stat name="total_accesses" value="%i"/>
				<stat name="total_misses" value="%i"/>
			</component>
			<component id="system.core.icache" name="icache">
				<param name="icache_config" value="%i,%i,%i,%i,%i,%i, %i, %i"/>
				<param name="buffer_sizes" value="16, 16, 16, 0"/>
				<stat name="read_accesses" value="%i"/>
				<stat name="write_accesses" value="7"/>
				<stat name="read_misses" value="%i"/>
			</component>
			<component id="system.core.dtlb" name="dtlb">
				<param name="number_entries" value="256"/>
				<stat name="total_accesses" value="%i"/>
				<stat name="total_misses" value="%i"/>
			</component>
			<component id="system.core.dcache" name="dcache">
				<param name="dcache_config" value="%i,%i,%i,%i,%i,%i, %i, %i"/>
				<param name="buffer_sizes" value="16, 16, 16, 16"/>
				<stat name="write_accesses" value="%i"/>
				<stat name="write_misses" value="%i"/>
			</component>
			<component id="system.core.BTB" name="BTB">
				<param name="BTB_config" value="18944,8,4,1, 1,3"/>
				<stat name="read_accesses" value="%i"/>
				<stat name="write_accesses" value="0"/>
			</component>
		</component>
		<component id="system.L20" name="L20">
			<param name="L2_config" value="%i,%i,%i,%i,%i,%i, %i, %i"/>
			<param name="buffer_sizes" value="16, 16, 16, 16"/>
			<param name="clockrate" value="%i"/>
			<param name="vdd" value="%f"/>
			<param name="ports" value="1,1,1"/>
			<stat name="read_accesses" value="%i"/>
			<stat name="write_accesses" value="%i"/>
			<stat name="read_misses" value="%i"/>
			<stat name="write_misses" value="%i"/>
			<stat name="duty_cycle" value="%f"/>
		</component>
		<component id="system.L30" name="L30">
			<param name="clockrate" value="%i"/>
		</component>
		<component id="system.mc" name="mc">
			<param name="mc_clock" value="200"/>
			<param name="block_size" value="32"/>
			<param name="number_mcs" value="0"/>
			<param name="number_ranks" value="1"/>
			<stat name="memory_accesses" value="%i"/>
			<stat name="memory_reads" value="%i"/>
			<stat name="memory_writes" value="%i"/>
		</component>
		<component id="system.niu" name="niu">
			<param name="clockrate" value="350"/>
		</component>
	</component>
</component>
"#;

/// Parses [`CORE_TEMPLATE`].
pub fn core_template() -> Template {
    Template::parse(CORE_TEMPLATE).unwrap()
}

//! Per-core replication and field dispatch tables.
//!
//! Each core copy is derived from the template's `core` component:
//! 1. **Identity:** The copy is renamed `core<i>` / `system.core<i>`, and `core` in the ids
//!    of its direct child components becomes `core<i>`.
//! 2. **Core Fields:** Direct child fields are looked up in [`CORE_FIELDS`] (and
//!    [`DUTY_CYCLE_FIELDS`] when duty cycles are emitted).
//! 3. **Sub-component Fields:** Fields of the child components (predictor, TLBs, L1 caches,
//!    BTB) are looked up in [`SUB_FIELDS`], keyed by the parent component's name.
//! 4. **References:** Any remaining `stats.…cpu.` / `config.…cpu.` reference in a value is
//!    rewritten to this core's index for the resolver.

use super::scope::CoreScope;
use super::system::core_clock;
use super::{MapperOptions, assign, find_rule, rewrite_cpu_refs};
use crate::common::{LookupError, format_float};
use crate::template::{Component, Field, Node};

/// A derivation over one core.
pub type CoreRule = for<'s, 'a> fn(&CoreScope<'s, 'a>) -> Result<String, LookupError>;

/// Integer and floating-point execute latencies added to the pipeline depth.
const X86_EXE: (i64, i64) = (2, 8);
const ARM_EXE: (i64, i64) = (3, 7);
const OTHER_EXE: (i64, i64) = (3, 6);

/// Fields that are direct children of a core component.
pub static CORE_FIELDS: &[(&str, CoreRule)] = &[
    // Configuration.
    ("peak_issue_width", |c| c.cpu_text("issueWidth")),
    ("issue_width", |c| c.cpu_text("issueWidth")),
    ("fetch_width", |c| c.cpu_text("fetchWidth")),
    ("decode_width", |c| c.cpu_text("decodeWidth")),
    ("commit_width", |c| c.cpu_text("commitWidth")),
    ("number_hardware_threads", |c| c.cpu_text("numThreads")),
    ("machine_type", machine_type),
    ("x86", is_x86),
    ("pipeline_depth", pipeline_depth),
    ("clock_rate", |c| core_clock(c.system)),
    ("vdd", |c| {
        c.config()
            .float("system.cpu_voltage_domain.voltage.0")
            .map(format_float)
    }),
    ("ROB_size", |c| c.cpu_text("numROBEntries")),
    ("phy_Regs_IRF_size", |c| c.cpu_text("numPhysIntRegs")),
    ("phy_Regs_FRF_size", |c| c.cpu_text("numPhysFloatRegs")),
    ("store_buffer_size", |c| c.cpu_text("SQEntries")),
    ("load_buffer_size", |c| c.cpu_text("LQEntries")),
    ("RAS_size", |c| c.cpu_text("branchPred.RASSize")),
    ("instruction_buffer_size", |c| c.cpu_int("fetchBufferSize").map(|n| n.to_string())),
    ("instruction_window_size", |c| c.cpu_int("numIQEntries").map(|n| (n / 2).to_string())),
    ("fp_instruction_window_size", |c| c.cpu_int("numIQEntries").map(|n| (n / 2).to_string())),
    ("ALU_per_core", |c| Ok(c.fu_pool()?.alu_per_core().to_string())),
    ("MUL_per_core", |c| Ok(c.fu_pool()?.mul_per_core().to_string())),
    ("FPU_per_core", |c| Ok(c.fu_pool()?.fpu_per_core().to_string())),
    // Instruction mix.
    ("total_instructions", |c| Ok(c.count_or_zero("commitStats0.numInsts").to_string())),
    ("int_instructions", |c| count(c, "commitStats0.numIntInsts")),
    ("fp_instructions", |c| count(c, "commitStats0.numFpInsts")),
    ("load_instructions", |c| count(c, "commitStats0.numLoadInsts")),
    ("store_instructions", |c| count(c, "commitStats0.numStoreInsts")),
    ("branch_instructions", |c| count(c, "branchPred.condPredicted")),
    ("branch_mispredictions", |c| count(c, "branchPred.condIncorrect")),
    ("committed_instructions", |c| count(c, "commit.numCommittedDist::total")),
    // Cycles.
    ("total_cycles", |c| count(c, "numCycles")),
    ("idle_cycles", |c| Ok(c.count_or_zero("idleCycles").to_string())),
    ("busy_cycles", |c| {
        Ok((c.count("numCycles")? - c.count_or_zero("idleCycles")).to_string())
    }),
    // Reorder buffer and register files.
    ("ROB_reads", |c| count(c, "rob.reads")),
    ("ROB_writes", |c| count(c, "rob.writes")),
    ("int_regfile_reads", |c| Ok(c.count_or_zero("executeStats0.numIntRegReads").to_string())),
    ("float_regfile_reads", |c| Ok(c.count_or_zero("executeStats0.numFpRegReads").to_string())),
    ("int_regfile_writes", |c| Ok(c.count_or_zero("executeStats0.numIntRegWrites").to_string())),
    ("float_regfile_writes", |c| count(c, "executeStats0.numFpRegWrites")),
    ("function_calls", |c| count(c, "commit.functionCalls")),
    // Execution units.
    ("ialu_accesses", |c| count(c, "intAluAccesses")),
    ("cdb_alu_accesses", |c| count(c, "intAluAccesses")),
    ("fpu_accesses", |c| count(c, "fpAluAccesses")),
    ("cdb_fpu_accesses", |c| count(c, "fpAluAccesses")),
    ("mul_accesses", mul_accesses),
    ("cdb_mul_accesses", mul_accesses),
    // Rename.
    ("rename_reads", |c| count(c, "rename.intLookups")),
    ("rename_writes", |c| rename_writes(c, "rename.intLookups")),
    ("fp_rename_reads", |c| count(c, "rename.fpLookups")),
    ("fp_rename_writes", |c| rename_writes(c, "rename.fpLookups")),
    // Instruction window.
    ("inst_window_reads", |c| count(c, "intInstQueueReads")),
    ("inst_window_writes", |c| count(c, "intInstQueueWrites")),
    ("inst_window_wakeup_accesses", |c| count(c, "intInstQueueWakeupAccesses")),
    ("fp_inst_window_reads", |c| count(c, "fpInstQueueReads")),
    ("fp_inst_window_writes", |c| count(c, "fpInstQueueWrites")),
    ("fp_inst_window_wakeup_accesses", |c| count(c, "fpInstQueueWakeupAccesses")),
];

/// Duty-cycle estimates, written only when `MapperOptions::emit_duty_cycles` is set.
pub static DUTY_CYCLE_FIELDS: &[(&str, CoreRule)] = &[
    ("IFU_duty_cycle", |c| Ok(format_float(c.fu_pool()?.ifu_duty))),
    ("LSU_duty_cycle", |c| Ok(format_float(c.fu_pool()?.lsu_duty))),
    ("MemManU_I_duty_cycle", |c| Ok(format_float(c.fu_pool()?.ifu_duty))),
    ("MemManU_D_duty_cycle", |c| Ok(format_float(c.fu_pool()?.lsu_duty))),
    ("ALU_duty_cycle", |c| Ok(format_float(c.fu_pool()?.alu_duty))),
    ("MUL_duty_cycle", |c| Ok(format_float(c.fu_pool()?.mul_duty))),
    ("FPU_duty_cycle", |c| Ok(format_float(c.fu_pool()?.fpu_duty))),
    ("ALU_cdb_duty_cycle", |c| Ok(format_float(c.fu_pool()?.alu_duty))),
    ("MUL_cdb_duty_cycle", |c| Ok(format_float(c.fu_pool()?.mul_duty))),
    ("FPU_cdb_duty_cycle", |c| Ok(format_float(c.fu_pool()?.fpu_duty))),
];

/// Fields of a core's child components, keyed by `(parent name, field name)`.
/// A `None` parent matches any child component.
pub static SUB_FIELDS: &[(Option<&str>, &str, CoreRule)] = &[
    // Branch predictor.
    (None, "local_predictor_size", local_predictor_size),
    (None, "local_predictor_entries", |c| c.cpu_text("branchPred.localHistoryTableSize")),
    (None, "global_predictor_size", |c| c.cpu_text("branchPred.globalPredictorSize")),
    (None, "global_predictor_bits", |c| c.cpu_text("branchPred.globalCtrBits")),
    (None, "chooser_predictor_entries", |c| c.cpu_text("branchPred.choicePredictorSize")),
    (None, "chooser_predictor_bits", |c| c.cpu_text("branchPred.choiceCtrBits")),
    // TLBs.
    (Some("itlb"), "number_entries", |c| c.cpu_text("mmu.itb.size")),
    (Some("dtlb"), "number_entries", |c| c.cpu_text("mmu.dtb.size")),
    (Some("itlb"), "total_accesses", |c| tlb_counter(c, "mmu.itb", "accesses", "Accesses")),
    (Some("dtlb"), "total_accesses", |c| tlb_counter(c, "mmu.dtb", "accesses", "Accesses")),
    (Some("itlb"), "total_misses", |c| tlb_counter(c, "mmu.itb", "misses", "Misses")),
    (Some("dtlb"), "total_misses", |c| tlb_counter(c, "mmu.dtb", "misses", "Misses")),
    // L1 caches.
    (None, "icache_config", |c| l1_config(c, "icache")),
    (None, "dcache_config", |c| l1_config(c, "dcache")),
    (Some("icache"), "buffer_sizes", |c| c.cpu_text("icache.mshrs").map(|m| repeat4(&m))),
    (Some("dcache"), "buffer_sizes", |c| c.cpu_text("dcache.mshrs").map(|m| repeat4(&m))),
    (Some("icache"), "read_accesses", |c| count_or_zero(c, "icache.ReadReq.accesses::total")),
    (Some("icache"), "write_accesses", |c| count(c, "icache.WriteReq.accesses::total")),
    (Some("icache"), "read_misses", |c| count_or_zero(c, "icache.ReadReq.misses::total")),
    (Some("icache"), "write_misses", |c| count_or_zero(c, "icache.WriteReq.misses::total")),
    (Some("dcache"), "read_accesses", |c| count_or_zero(c, "dcache.ReadReq.accesses::total")),
    (Some("dcache"), "write_accesses", |c| count_or_zero(c, "dcache.WriteReq.accesses::total")),
    (Some("dcache"), "read_misses", |c| count_or_zero(c, "dcache.ReadReq.misses::total")),
    (Some("dcache"), "write_misses", |c| count_or_zero(c, "dcache.WriteReq.misses::total")),
    // Branch target buffer.
    (None, "BTB_config", btb_config),
    (Some("BTB"), "read_accesses", |c| count_or_zero(c, "branchPred.BTBLookups")),
    (Some("BTB"), "write_accesses", |c| count_or_zero(c, "branchPred.BTBHits")),
];

/// Builds the copy of `template` for the core in `scope`.
///
/// # Arguments
///
/// * `scope` - The core being instantiated.
/// * `template` - The template's `core` component. It is not modified.
/// * `options` - Mapper options.
///
/// # Returns
///
/// The filled `core<i>` component.
pub fn instantiate(scope: &CoreScope<'_, '_>, template: &Component, options: MapperOptions) -> Component {
    let index = scope.index;
    let mut core = template.clone();
    core.name = format!("core{index}");
    core.id = format!("system.core{index}");

    let indexed = format!("core{index}");
    for child in &mut core.children {
        match child {
            Node::Field(field) => {
                fill_core_field(scope, &core.id, field, options);
                field.value = rewrite_cpu_refs(&field.value, index);
            }
            Node::Component(sub) => {
                sub.id = sub.id.replace("core", &indexed);
                for grandchild in &mut sub.children {
                    if let Node::Field(field) = grandchild {
                        fill_sub_field(scope, &sub.id, &sub.name, field);
                        field.value = rewrite_cpu_refs(&field.value, index);
                    }
                }
            }
            Node::Comment(_) => {}
        }
    }

    tracing::debug!(core = index, "core instantiated");
    core
}

fn fill_core_field(scope: &CoreScope<'_, '_>, owner: &str, field: &mut Field, options: MapperOptions) {
    let rule = find_rule(CORE_FIELDS, &field.name).or_else(|| {
        options
            .emit_duty_cycles
            .then(|| find_rule(DUTY_CYCLE_FIELDS, &field.name))
            .flatten()
    });
    if let Some(rule) = rule {
        assign(owner, field, rule(scope));
    }
}

fn fill_sub_field(scope: &CoreScope<'_, '_>, owner: &str, parent: &str, field: &mut Field) {
    let rule = SUB_FIELDS
        .iter()
        .find(|(p, name, _)| *name == field.name && p.is_none_or(|p| p == parent))
        .map(|(_, _, rule)| *rule);
    if let Some(rule) = rule {
        assign(owner, field, rule(scope));
    }
}

fn count(scope: &CoreScope<'_, '_>, suffix: &str) -> Result<String, LookupError> {
    scope.count(suffix).map(|n| n.to_string())
}

fn count_or_zero(scope: &CoreScope<'_, '_>, suffix: &str) -> Result<String, LookupError> {
    Ok(scope.count_or_zero(suffix).to_string())
}

fn repeat4(value: &str) -> String {
    [value; 4].join(",")
}

/// `0` for out-of-order CPU models, `1` for in-order ones.
fn machine_type(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    let cpu_type = scope.config().string(&scope.cpu_path("type"))?;
    Ok(if cpu_type.contains("O3") { "0" } else { "1" }.to_owned())
}

fn isa_type<'a>(scope: &CoreScope<'_, 'a>) -> Result<&'a str, LookupError> {
    scope.config().string(&scope.cpu_path("isa.0.type"))
}

fn is_x86(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    Ok(if isa_type(scope)? == "X86ISA" { "1" } else { "0" }.to_owned())
}

/// Execute latencies for the pipeline depth, chosen by ISA prefix.
fn execute_latencies(isa: &str) -> (i64, i64) {
    if isa.starts_with("X86") {
        X86_EXE
    } else if isa.starts_with("ARM") {
        ARM_EXE
    } else {
        OTHER_EXE
    }
}

/// `<int depth>,<fp depth>`: front-end delays plus the longest commit feedback path plus
/// the ISA's execute latency.
fn pipeline_depth(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    let (int_exe, fp_exe) = execute_latencies(isa_type(scope)?);

    let base = scope.cpu_int("fetchToDecodeDelay")?
        + scope.cpu_int("decodeToRenameDelay")?
        + scope.cpu_int("renameToIEWDelay")?
        + scope.cpu_int("iewToCommitDelay")?;
    let max_base = [
        base,
        scope.cpu_int("commitToDecodeDelay")?,
        scope.cpu_int("commitToFetchDelay")?,
        scope.cpu_int("commitToIEWDelay")?,
        scope.cpu_int("commitToRenameDelay")?,
    ]
    .into_iter()
    .max()
    .unwrap_or(base);

    Ok(format!(
        "{},{}",
        int_exe + base + max_base,
        fp_exe + base + max_base
    ))
}

fn mul_accesses(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    let div = scope.count("statIssuedInstType_0::IntDiv")?;
    let mul = scope.count("statIssuedInstType_0::IntMult")?;
    Ok((div + mul).to_string())
}

/// Renamed operands attributed to one register class: `renamedOperands * lookups_of_class / lookups`.
fn rename_writes(scope: &CoreScope<'_, '_>, class_lookups: &str) -> Result<String, LookupError> {
    let operands = scope.value("rename.renamedOperands")?;
    let class = scope.value(class_lookups)?;
    let lookups = scope.value("rename.lookups")?;
    if lookups == 0.0 {
        return Err(LookupError::DivisionByZero("rename writes"));
    }
    Ok(((operands * class / lookups) as i64).to_string())
}

/// TLB counter: one statistic on a one-core system, read + write on a multi-core one.
fn tlb_counter(scope: &CoreScope<'_, '_>, tlb: &str, total: &str, split: &str) -> Result<String, LookupError> {
    let n = if scope.system.single_core() {
        scope.count(&format!("{tlb}.{total}"))?
    } else {
        scope.count(&format!("{tlb}.rd{split}"))? + scope.count(&format!("{tlb}.wr{split}"))?
    };
    Ok(n.to_string())
}

fn local_predictor_size(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    let size = scope.config().float(&scope.cpu_path("branchPred.localPredictorSize"))?;
    if size <= 0.0 {
        return Err(LookupError::WrongType {
            path: scope.cpu_path("branchPred.localPredictorSize"),
            expected: "a positive size",
        });
    }
    let ctr_bits = scope.cpu_text("branchPred.localCtrBits")?;
    Ok(format!("{},{ctr_bits}", size.log2() as i64))
}

/// `capacity,block,assoc,bank,throughput,latency,output width,policy` for an L1 cache.
fn l1_config(scope: &CoreScope<'_, '_>, cache: &str) -> Result<String, LookupError> {
    let block = scope.cpu_int(&format!("{cache}.tags.block_size"))?;
    let throughput = match scope.cpu_text(&format!("{cache}.throughput")) {
        Ok(t) => t,
        Err(_) => derived_throughput(scope, cache, block).to_string(),
    };
    Ok([
        scope.cpu_text(&format!("{cache}.size"))?,
        block.to_string(),
        scope.cpu_text(&format!("{cache}.assoc"))?,
        scope.cpu_text_or(&format!("{cache}.bank"), "1"),
        throughput,
        scope.cpu_text(&format!("{cache}.response_latency"))?,
        block.to_string(),
        scope.cpu_text_or(&format!("{cache}.cache_policy"), "1"),
    ]
    .join(","))
}

/// Accessed bytes per core cycle, or 0 when the counters are unavailable.
fn derived_throughput(scope: &CoreScope<'_, '_>, cache: &str, block: i64) -> i64 {
    let accesses = scope.value(&format!("{cache}.overallAccesses::total"));
    let cycles = scope.value("numCycles");
    match (accesses, cycles) {
        (Ok(a), Ok(c)) if c != 0.0 => (a * block as f64 / c) as i64,
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(core = scope.index, cache, error = %e, "throughput set to 0");
            0
        }
        _ => {
            tracing::warn!(core = scope.index, cache, "zero cycles, throughput set to 0");
            0
        }
    }
}

/// `entries,tag size,ways,bank,throughput,latency` for the branch target buffer.
fn btb_config(scope: &CoreScope<'_, '_>) -> Result<String, LookupError> {
    let entries = scope.cpu_text("branchPred.BTBEntries")?;
    let tag_size = scope.cpu_int("branchPred.BTBTagSize")?;
    let ways = scope.cpu_text("branchPred.indirectBranchPred.indirectWays")?;
    let bank = scope.cpu_text_or("branchPred.bank", "1");

    let throughput = match (scope.value("numCycles"), scope.value("branchPred.lookups")) {
        (Ok(cycles), _) if cycles == 0.0 => 0,
        (Ok(cycles), Ok(lookups)) => (lookups * tag_size as f64 / cycles) as i64,
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(core = scope.index, error = %e, "BTB throughput set to 0");
            0
        }
    };

    let latency = scope.cpu_text("icache.response_latency")?;
    Ok(format!("{entries},{tag_size},{ways},{bank},{throughput},{latency}"))
}

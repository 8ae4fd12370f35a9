//! Functional-unit pool enumeration.
//!
//! gem5 describes each core's execution resources as a list of functional units, each
//! with a `count` and an `opList` of operation classes. McPAT wants unit counts per class
//! (ALU, MUL, FPU) and rough duty cycles. This module folds the pool into both:
//! 1. **Unit Counts:** Each op of a unit contributes `count / len(opList)` to its class.
//! 2. **Duty Cycles:** Each op contributes `1` if pipelined, else `1 / opLat`, scaled per
//!    class (`/ len(opList)` for ALU and IFU, `/ 4` for LSU capped at 1, `/ 2` for MUL,
//!    `/ 8` for FPU).

use serde::Deserialize;

use crate::common::LookupError;
use crate::config::ConfigStore;

/// Upper bound of the load/store duty cycle.
const LSU_DUTY_CAP: f64 = 1.0;

/// Operation classes executed by the load/store unit.
const LSU_CLASSES: &[&str] = &["MemRead", "MemWrite", "FloatMemRead", "FloatMemWrite"];

/// Operation classes executed by the floating-point unit.
const FPU_CLASSES: &[&str] = &[
    "FloatAdd",
    "FloatCmp",
    "FloatCvt",
    "FloatMult",
    "FloatDiv",
    "FloatSqrt",
    "FloatMultAcc",
    "FloatMisc",
];

/// One entry of `fuPool.FUList`.
#[derive(Debug, Clone, Deserialize)]
struct FuDesc {
    count: f64,
    #[serde(rename = "opList", default)]
    op_list: Vec<OpDesc>,
}

/// One entry of a unit's `opList`.
#[derive(Debug, Clone, Deserialize)]
struct OpDesc {
    #[serde(rename = "opClass")]
    op_class: String,
    #[serde(rename = "opLat")]
    op_lat: Option<f64>,
    pipelined: Option<bool>,
}

/// What a core's functional-unit pool amounts to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuPoolSummary {
    /// Integer ALUs (`IntAlu` ops).
    pub alu_units: f64,
    /// Multiply/divide units (`IntMult`, `IntDiv` ops).
    pub mul_units: f64,
    /// Floating-point units (`Float*` arithmetic ops).
    pub fpu_units: f64,
    /// Instruction fetch unit duty cycle (`IprAccess` ops).
    pub ifu_duty: f64,
    /// Load/store unit duty cycle (memory ops), at most 1.
    pub lsu_duty: f64,
    /// Integer ALU duty cycle.
    pub alu_duty: f64,
    /// Multiplier duty cycle.
    pub mul_duty: f64,
    /// FPU duty cycle.
    pub fpu_duty: f64,
}

impl FuPoolSummary {
    /// Enumerates `system.cpu.<core>.fuPool.FUList`.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    /// * `core` - Core index.
    ///
    /// # Returns
    ///
    /// The summary, or a `LookupError` if the pool is missing or malformed, or if an op
    /// that feeds a duty cycle lacks `pipelined`/`opLat`.
    pub fn from_config(config: &ConfigStore, core: usize) -> Result<Self, LookupError> {
        let path = format!("system.cpu.{core}.fuPool.FUList");
        let units: Vec<FuDesc> = serde_json::from_value(config.lookup(&path)?.clone()).map_err(|_| {
            LookupError::WrongType {
                path: path.clone(),
                expected: "a functional-unit list",
            }
        })?;

        let mut summary = Self::default();
        for unit in &units {
            summary.add_unit(unit, &path)?;
        }
        Ok(summary)
    }

    fn add_unit(&mut self, unit: &FuDesc, path: &str) -> Result<(), LookupError> {
        let ops = unit.op_list.len() as f64;
        let share = unit.count / ops;

        for op in &unit.op_list {
            let class = op.op_class.as_str();
            match class {
                "IntAlu" => {
                    self.alu_units += share;
                    self.alu_duty += op.weight(path)? / ops;
                }
                "IprAccess" => {
                    self.ifu_duty += op.weight(path)? / ops;
                }
                "IntMult" | "IntDiv" => {
                    self.mul_units += share;
                    self.mul_duty += op.weight(path)? / 2.0;
                }
                _ if LSU_CLASSES.contains(&class) => {
                    self.lsu_duty = (self.lsu_duty + op.weight(path)? / 4.0).min(LSU_DUTY_CAP);
                }
                _ if FPU_CLASSES.contains(&class) => {
                    self.fpu_units += share;
                    self.fpu_duty += op.weight(path)? / 8.0;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// ALU count, truncated.
    pub const fn alu_per_core(&self) -> i64 {
        self.alu_units as i64
    }

    /// Multiplier count, truncated.
    pub const fn mul_per_core(&self) -> i64 {
        self.mul_units as i64
    }

    /// FPU count, truncated.
    pub const fn fpu_per_core(&self) -> i64 {
        self.fpu_units as i64
    }
}

impl OpDesc {
    /// Occupancy contributed by one op: 1 when pipelined, `1 / opLat` otherwise.
    fn weight(&self, path: &str) -> Result<f64, LookupError> {
        let pipelined = self.pipelined.ok_or_else(|| LookupError::MissingKey {
            path: path.to_owned(),
            segment: "pipelined".to_owned(),
        })?;
        if pipelined {
            return Ok(1.0);
        }
        let latency = self.op_lat.ok_or_else(|| LookupError::MissingKey {
            path: path.to_owned(),
            segment: "opLat".to_owned(),
        })?;
        if latency == 0.0 {
            return Err(LookupError::DivisionByZero("functional-unit duty cycle"));
        }
        Ok(1.0 / latency)
    }
}

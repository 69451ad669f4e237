use crate::plan::Plan;
use anyhow::Context;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub fn load_plan_file(path: impl AsRef<Path>) -> anyhow::Result<Plan> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading plan: {}", path.display()))?;
    parse_plan(&raw).with_context(|| format!("in plan: {}", path.display()))
}

pub fn parse_plan(raw: &str) -> anyhow::Result<Plan> {
    let val: Value = serde_yaml::from_str(raw).context("parsing yaml")?;
    let plan: Plan = serde_yaml::from_value(val).context("decoding plan")?;
    Ok(plan)
}

/// Merge every `*.yml` / `*.yaml` plan in `dir`, in file name order.
pub fn load_plans_dir(dir: impl AsRef<Path>) -> anyhow::Result<Plan> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yml" || ext == "yaml" {
                entries.push(path);
            }
        }
    }
    entries.sort();
    let mut merged = Plan {
        devices: Vec::new(),
    };
    for p in entries {
        let plan = load_plan_file(&p)?;
        merged.devices.extend(plan.devices);
    }
    Ok(merged)
}

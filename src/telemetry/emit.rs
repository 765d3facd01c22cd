use anyhow::Result;
use serde::Serialize;

use crate::output::config::{OutputConfig, OutputFormat};
use crate::output::types::Envelope;
use crate::output::Emitter;

use super::config;

pub fn print_plan<T: Serialize>(op: &'static str, plan: &T) -> Result<()> {
    let env = Envelope::plan(op, plan)?;
    emitter().emit(&env)?;
    Ok(())
}

pub fn print_result<T: Serialize>(op: &'static str, result: &T) -> Result<()> {
    let env = Envelope::result(op, result)?;
    emitter().emit(&env)?;
    Ok(())
}

fn emitter() -> Emitter {
    let mut cfg = OutputConfig::from_env();
    if config::json_mode() { cfg.format = OutputFormat::Json; }
    Emitter::from_config(cfg)
}

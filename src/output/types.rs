use std::sync::LazyLock;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "taplist.v1";

static RUN: LazyLock<(Uuid, Instant)> = LazyLock::new(|| (Uuid::new_v4(), Instant::now()));

/// Process-wide run identity; every envelope printed by one invocation shares `run_id`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub elapsed_ms: u128,
}

impl RunMeta {
    /// Pin the run start. Called once from `main`; later calls are no-ops.
    pub fn start() { LazyLock::force(&RUN); }

    pub fn current() -> Self {
        let (run_id, t0) = *RUN;
        RunMeta { run_id, elapsed_ms: t0.elapsed().as_millis() }
    }
}

/// One plan or one result for a command.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub run: RunMeta,
}

impl Envelope {
    pub fn plan<T: Serialize>(op: &'static str, plan: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, false, serde_json::to_value(plan)?))
    }

    pub fn result<T: Serialize>(op: &'static str, result: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, true, serde_json::to_value(result)?))
    }

    fn new(op: &'static str, apply: bool, body: Value) -> Self {
        let (plan, result) = if apply { (None, Some(body)) } else { (Some(body), None) };
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply,
            plan,
            result,
            run: RunMeta::current(),
        }
    }
}

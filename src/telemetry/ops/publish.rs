use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Publish;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Collect, ClearBucket, Upload }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Collect => "collect",
        Phase::ClearBucket => "clear_bucket",
        Phase::Upload => "upload",
    }}
    fn span(&self) -> Span { match self {
        Phase::Collect => info_span!("collect"),
        Phase::ClearBucket => info_span!("clear_bucket"),
        Phase::Upload => info_span!("upload"),
    }}
}

impl OpMarker for Publish {
    const NAME: &'static str = "publish";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("publish") }
}

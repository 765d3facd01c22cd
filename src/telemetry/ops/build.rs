use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Build;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Group, Clear, Render, Write, CopyStatic }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Group => "group",
        Phase::Clear => "clear",
        Phase::Render => "render",
        Phase::Write => "write",
        Phase::CopyStatic => "copy_static",
    }}
    fn span(&self) -> Span { match self {
        Phase::Group => info_span!("group"),
        Phase::Clear => info_span!("clear"),
        Phase::Render => info_span!("render"),
        Phase::Write => info_span!("write"),
        Phase::CopyStatic => info_span!("copy_static"),
    }}
}

impl OpMarker for Build {
    const NAME: &'static str = "build";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("build") }
}

//! Connect-map graph engine.
//!
//! Turns four relational collections (people, talks, talk/speaker links and
//! user-authored connections) into a deduplicated node/edge graph, then
//! positions it with either a deterministic grouped layout or a seeded
//! force simulation.
//!
//! Zero I/O. Every entry point is a pure function of its inputs and never
//! fails on dirty data: skipped rows and clamped values come back as
//! [`Diagnostic`]s next to a best-effort result.

pub mod constants;
pub mod diagnostic;
pub mod entity;
pub mod force;
pub mod graph;
pub mod grouped;
pub mod layout;
pub mod normalize;
pub mod wire;

pub use diagnostic::{ConnectionDefect, Diagnostic, DiagnosticKind};
pub use entity::{Connection, Dataset, LabelField, Person, Talk, TalkSpeakerLink};
pub use force::{ForceConfig, layout_force};
pub use graph::{
    BuildPolicy, Edge, EdgeKind, Graph, GraphStats, Node, NodeId, NodeKind, NodePayload, build,
    build_with,
};
pub use grouped::layout_grouped;
pub use layout::{Layout, LayoutStrategy, Position, layout};
pub use normalize::{
    ConnectionRecord, ConnectionTarget, NormalizedEntities, PersonRecord, Role, RoleTags,
    TalkRecord, normalize,
};
pub use wire::{WireGraph, export_layout, import_dataset};

//! CVI core library - coastal vulnerability index registry and scoring engine

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Index definitions are owned by an explicit registry, never a global
// - Definitions are immutable once registered
// - Map-typed data iterates in key order; output order is input order
// - No clocks or randomness; identical input yields identical output
// - Validation collects every problem; parsing and numeric domain errors fail fast

pub mod aggregation;
pub mod builtin;
pub mod classification;
pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod mapper;
pub mod parameter;
pub mod ranking;
pub mod registry;
pub mod report;
pub mod segment;
pub mod store;
pub mod validation;

pub use aggregation::{aggregate, compute_statistics, FormulaConfig, FormulaKind, Statistics};
pub use classification::classify;
pub use config::ResolvedConfig;
pub use engine::{
    CompositeResult, RunOptions, RunReport, ScoringEngine, SkippedSegment, UnclassifiedSegment,
};
pub use error::{CviError, Result};
pub use index::{ClassBand, IndexDefinition, IndexKind};
pub use mapper::{score_for, RawValue};
pub use parameter::{Parameter, ParameterCategory, ParameterKind};
pub use ranking::{RankingEntry, VulnerabilityLevel};
pub use registry::IndexRegistry;
pub use report::{render_json, render_text};
pub use segment::{group_values, SegmentInput, SegmentParameterValue};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use validation::{validate, ValidationReport, ValidationRule};

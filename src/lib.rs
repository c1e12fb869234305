//! Load GAF alignments whose paths walk a sequence graph, and query
//! them by mapping quality and by the segments they visit.
//!
//! Each record's path field is parsed by `path_parser` into oriented
//! steps, checked by a `graph::PathValidator`, and collected by
//! `gaf` into an `IngestionResult` together with one diagnostic per
//! skipped line. `query` filters and pages the result.

pub mod gaf;
pub mod graph;
pub mod path_parser;
pub mod query;
pub mod walk;

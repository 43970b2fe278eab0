//! Graph pretty-printer, the spec's out-of-scope "external collaborator #3".
//!
//! Grounded on `printGraph` in `original_source/src/main.c`, which dumps
//! every vertex's name alongside its active degree after a configurable
//! number of input lines, for manual inspection while debugging the engine.

use crate::engine::GraphEngine;
use std::fmt::Write as _;

/// Renders every live vertex as `name: degree`, one per line, ordered by
/// ascending `VertexId` the same way the original walks its arena
/// front-to-back rather than bucket-by-bucket.
pub fn dump(engine: &GraphEngine) -> String {
    let mut out = String::new();
    let table = engine.vertices();
    for id in table.snapshot_ids() {
        let _ = writeln!(out, "{}: {}", table.name(id), table.edges(id).active_length());
    }
    out
}

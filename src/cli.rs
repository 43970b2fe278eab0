//! Argument parsing and validation, the spec's out-of-scope "external
//! collaborator #2".
//!
//! Grounded on the `switch (argc)` ladder in `original_source/src/main.c`,
//! which accepts zero to four positional arguments, each with a default
//! that takes effect only once every argument before it has been supplied.
//! `structopt` is the idiomatic replacement for that ladder: same
//! positionals, same defaults, same left-to-right dependency.

use anyhow::{Context, Result};
use std::path::PathBuf;
use structopt::StructOpt;

use crate::median::MedianAlgorithm;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rollgraph",
    about = "Streaming rolling-window graph engine: per-event median vertex degree"
)]
pub struct Opt {
    /// Input file of newline-delimited payment events.
    #[structopt(default_value = "input.txt")]
    pub input: PathBuf,

    /// Output file that receives one median per processed line.
    #[structopt(default_value = "output.txt")]
    pub output: PathBuf,

    /// Median algorithm: 1 for the naive sort-based median, 2 for the
    /// histogram-based fast median.
    #[structopt(default_value = "2")]
    median_alg: String,

    /// 1-based input line number to pretty-print the graph state after, or
    /// 0 to never dump.
    #[structopt(default_value = "0")]
    pub print_entry: usize,
}

impl Opt {
    pub fn median_algorithm(&self) -> Result<MedianAlgorithm> {
        self.median_alg
            .parse()
            .with_context(|| format!("invalid --median-alg {:?}", self.median_alg))
    }
}

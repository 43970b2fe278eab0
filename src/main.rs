#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::similar_names, clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use log::info;
use rollgraph::cli::Opt;
use rollgraph::engine::GraphEngine;
use rollgraph::{debug_dump, parser};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use structopt::StructOpt;

fn main() -> Result<()> {
    env_logger::from_env(env_logger::Env::new().filter_or("ROLLGRAPH_LOG", "info"))
        .format_timestamp_millis()
        .init();

    let opt = Opt::from_args();
    let algorithm = opt.median_algorithm()?;

    let input = File::open(&opt.input)
        .with_context(|| format!("could not open input file {:?}", opt.input))?;
    let mut output = File::create(&opt.output)
        .with_context(|| format!("could not open output file {:?}", opt.output))?;

    let mut engine = GraphEngine::new(algorithm);

    for (line_no, line) in BufReader::new(input).lines().enumerate() {
        let line = line.with_context(|| format!("failed reading line {}", line_no + 1))?;
        let event = parser::parse_line(&line);

        let median = engine.ingest(event);

        if let Some(median) = median {
            writeln!(output, "{median:.2}")
                .with_context(|| format!("failed writing line {}", line_no + 1))?;
        }

        if opt.print_entry != 0 && line_no + 1 == opt.print_entry {
            info!("graph state after line {}:\n{}", line_no + 1, debug_dump::dump(&engine));
        }
    }

    info!("total time spent computing medians: {:?}", engine.median_time());
    Ok(())
}

use std::path::Path;

use anyhow::Context;
use compress_io::compress::CompressIo;
use serde::Serialize;

use crate::{
    algorithm::{ComputeResults, KmerParams},
    cli::ComputeConfig,
};

#[derive(Serialize)]
struct JsOutput<'a, 'b> {
    program: &'static str,
    version: &'static str,
    date: String,
    input: &'a Path,
    output: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    temp: Option<&'a Path>,
    parameters: KmerParams,
    #[serde(flatten)]
    results: &'b ComputeResults,
}

impl<'a, 'b> JsOutput<'a, 'b> {
    fn make(cfg: &'a ComputeConfig, results: &'b ComputeResults) -> Self {
        Self {
            program: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            date: cfg.date().to_rfc2822(),
            input: cfg.input(),
            output: cfg.output(),
            temp: cfg.temp(),
            parameters: cfg.params(),
            results,
        }
    }
}

fn output_json<P: AsRef<Path>>(
    name: P,
    cfg: &ComputeConfig,
    res: &ComputeResults,
) -> anyhow::Result<()> {
    debug!("Writing JSON report");
    let wrt = CompressIo::new()
        .path(name)
        .bufwriter()
        .with_context(|| "Could not open output JSON file")?;

    let out = JsOutput::make(cfg, res);

    serde_json::to_writer_pretty(wrt, &out).with_context(|| "Error writing out JSON report")
}

/// Write the run report if one was requested
pub fn output(cfg: &ComputeConfig, res: &ComputeResults) -> anyhow::Result<()> {
    match cfg.report() {
        Some(name) => output_json(name, cfg, res),
        None => Ok(()),
    }
}

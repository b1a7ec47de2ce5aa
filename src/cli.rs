use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::ArgMatches;

use crate::algorithm::KmerParams;

mod cli_model;

pub struct ComputeConfig {
    input: PathBuf,
    output: PathBuf,
    temp: Option<PathBuf>,
    report: Option<PathBuf>,
    params: KmerParams,
    second_phase: bool,
    date: DateTime<Local>,
}

impl ComputeConfig {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn temp(&self) -> Option<&Path> {
        self.temp.as_deref()
    }

    pub fn report(&self) -> Option<&Path> {
        self.report.as_deref()
    }

    pub fn params(&self) -> KmerParams {
        self.params
    }

    pub fn second_phase(&self) -> bool {
        self.second_phase
    }

    pub fn date(&self) -> &DateTime<Local> {
        &self.date
    }
}

pub struct ExactConfig {
    input: PathBuf,
    output: PathBuf,
    params: KmerParams,
}

impl ExactConfig {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn params(&self) -> KmerParams {
        self.params
    }
}

pub struct CompareConfig {
    output: PathBuf,
    golden: PathBuf,
}

impl CompareConfig {
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn golden(&self) -> &Path {
        &self.golden
    }
}

pub enum Task {
    Compute(ComputeConfig),
    Exact(ExactConfig),
    Compare(CompareConfig),
}

fn get_path(m: &ArgMatches, name: &str) -> anyhow::Result<PathBuf> {
    m.get_one::<PathBuf>(name)
        .map(|p| p.to_owned())
        .ok_or_else(|| anyhow!("Missing required argument {name}"))
}

fn get_usize(m: &ArgMatches, name: &str) -> anyhow::Result<usize> {
    m.get_one::<u64>(name)
        .map(|x| *x as usize)
        .ok_or_else(|| anyhow!("Missing default argument {name}"))
}

fn kmer_params(m: &ArgMatches, bits_per_element: usize) -> anyhow::Result<KmerParams> {
    Ok(KmerParams::new(
        get_usize(m, "kmer_length")?,
        bits_per_element,
        m.get_flag("unidirectional"),
        !m.get_flag("no_splice"),
    ))
}

fn compute_config(m: &ArgMatches) -> anyhow::Result<ComputeConfig> {
    let bits_per_element = get_usize(m, "bits_per_element")?;
    Ok(ComputeConfig {
        input: get_path(m, "input")?,
        output: get_path(m, "output")?,
        temp: m.get_one::<PathBuf>("temp").map(|p| p.to_owned()),
        report: m.get_one::<PathBuf>("report").map(|p| p.to_owned()),
        params: kmer_params(m, bits_per_element)?,
        second_phase: !m.get_flag("first_phase_only"),
        date: Local::now(),
    })
}

fn exact_config(m: &ArgMatches) -> anyhow::Result<ExactConfig> {
    Ok(ExactConfig {
        input: get_path(m, "input")?,
        output: get_path(m, "output")?,
        params: kmer_params(m, 0)?,
    })
}

fn compare_config(m: &ArgMatches) -> anyhow::Result<CompareConfig> {
    Ok(CompareConfig {
        output: get_path(m, "output")?,
        golden: get_path(m, "golden")?,
    })
}

fn task_from_matches(m: &ArgMatches) -> anyhow::Result<Task> {
    match m.subcommand() {
        Some(("compute", sm)) => compute_config(sm).map(Task::Compute),
        Some(("exact", sm)) => exact_config(sm).map(Task::Exact),
        Some(("compare", sm)) => compare_config(sm).map(Task::Compare),
        _ => Err(anyhow!("Unknown or missing command")),
    }
}

pub fn handle_cli() -> anyhow::Result<Task> {
    let c = cli_model::cli_model();
    let m = c.get_matches();
    // Global options are propagated down to the subcommand
    super::utils::init_log(m.subcommand().map(|(_, sm)| sm).unwrap_or(&m));
    task_from_matches(&m)
}

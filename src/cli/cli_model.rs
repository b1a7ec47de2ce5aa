use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, Command};

use crate::{kmers::MAX_KMER_LENGTH, utils::LogLevel};

/// Upper bound on filter bits per distinct kmer
const MAX_BITS_PER_ELEMENT: u64 = 64;

fn kmer_length_arg() -> Arg {
    Arg::new("kmer_length")
        .short('k')
        .long("kmer-length")
        .value_parser(value_parser!(u64).range(1..=MAX_KMER_LENGTH as u64))
        .value_name("INT")
        .default_value("31")
        .help("Set kmer length")
}

fn unidirectional_arg() -> Arg {
    Arg::new("unidirectional")
        .short('u')
        .long("unidirectional")
        .action(ArgAction::SetTrue)
        .help("Treat a kmer and its reverse complement as different kmers")
}

fn no_splice_arg() -> Arg {
    Arg::new("no_splice")
        .short('s')
        .long("no-splice")
        .action(ArgAction::SetTrue)
        .help("Keep runs of absent bases that are not needed to spell present kmers")
}

fn input_arg() -> Arg {
    Arg::new("input")
        .value_parser(value_parser!(PathBuf))
        .value_name("INPUT")
        .required(true)
        .help("Input FASTA file")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .value_parser(value_parser!(PathBuf))
        .value_name("OUTPUT")
        .required(true)
        .help("Output masked superstring file")
}

fn compute_model() -> Command {
    Command::new("compute")
        .about("Compute an approximate masked superstring from input FASTA")
        .arg(kmer_length_arg())
        .arg(
            Arg::new("bits_per_element")
                .short('b')
                .long("bits-per-element")
                .value_parser(value_parser!(u64).range(1..=MAX_BITS_PER_ELEMENT))
                .value_name("INT")
                .default_value("10")
                .help("Set number of filter bits per distinct kmer (1-64)"),
        )
        .arg(
            Arg::new("temp")
                .short('t')
                .long("temp")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set path of the first phase output [default: temporary file]"),
        )
        .arg(unidirectional_arg())
        .arg(no_splice_arg())
        .arg(
            Arg::new("first_phase_only")
                .short('f')
                .long("first-phase-only")
                .action(ArgAction::SetTrue)
                .conflicts_with("temp")
                .help("Skip the counting Bloom filter correction"),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Write a JSON report of the run"),
        )
        .arg(input_arg())
        .arg(output_arg())
}

fn exact_model() -> Command {
    Command::new("exact")
        .about("Compute an exact masked superstring from input FASTA")
        .arg(kmer_length_arg())
        .arg(unidirectional_arg())
        .arg(no_splice_arg())
        .arg(input_arg())
        .arg(output_arg())
}

fn compare_model() -> Command {
    Command::new("compare")
        .about("Compare exact and approximate masked superstrings and report accuracy")
        .arg(
            Arg::new("output")
                .value_parser(value_parser!(PathBuf))
                .value_name("OUTPUT")
                .required(true)
                .help("Approximate masked superstring"),
        )
        .arg(
            Arg::new("golden")
                .value_parser(value_parser!(PathBuf))
                .value_name("GOLDEN")
                .required(true)
                .help("Exact masked superstring"),
        )
}

pub(super) fn cli_model() -> Command {
    command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .global(true)
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .global(true)
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .global(true)
                .help("Silence all output"),
        )
        .subcommand(compute_model())
        .subcommand(exact_model())
        .subcommand(compare_model())
}

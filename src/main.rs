#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

mod algorithm;
mod bitset;
mod cli;
mod hash;
mod kmers;
mod modular;
mod output;
mod reader;
mod sketch;
mod utils;
mod writer;

use cli::Task;

fn main() -> anyhow::Result<()> {
    match cli::handle_cli()? {
        Task::Compute(cfg) => {
            let res = algorithm::compute(&cfg)?;
            output::output(&cfg, &res)
        }
        Task::Exact(cfg) => algorithm::compute_exact(&cfg).map(|_| ()),
        Task::Compare(cfg) => {
            let acc = algorithm::compare(&cfg)?;
            print!("{acc}");
            Ok(())
        }
    }
}

use std::path::PathBuf;

use anyhow::Result;
use rusty_iris::config::RunConfig;
use rusty_iris::session::Session;

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => RunConfig::from_path(&PathBuf::from(path))?,
        None => RunConfig::default(),
    };

    let session = Session::open(&config)?;
    for (name, subset) in [("train", &session.train), ("test", &session.test)] {
        let summary = Session::run_epoch(subset, &config.loader)?;
        println!(
            "{name}: {} records in {} batches, per label {:?}",
            summary.records, summary.batches, summary.label_counts
        );
    }
    Ok(())
}

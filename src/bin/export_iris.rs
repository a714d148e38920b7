use std::path::PathBuf;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();

    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let dir = rusty_iris::iris::export(&root)
        .with_context(|| format!("exporting iris under {}", root.display()))?;
    println!("Wrote iris tables to {}", dir.display());
    Ok(())
}

use std::env;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args.next().context("Missing path argument")?;

    let value = yamlet::parse_file(&path).with_context(|| path.clone())?;

    print!("{}", yamlet::emit(&value));
    Ok(())
}

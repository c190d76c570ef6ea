//! `switchyard-demo`: a small multi-command program built on switchyard.

use std::io::{self, Write};

use anyhow::Result;
use switchyard::Dispatcher;
use switchyard_cli::{build_registry, init_logging, load_config};
use tracing::debug;

fn main() -> Result<()> {
    init_logging()?;

    let dispatcher = Dispatcher::with_config(build_registry(), load_config())?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut out = io::stdout();
    let mut err = io::stderr();
    let code = dispatcher.dispatch(&args, &mut out, &mut err);
    out.flush()?;

    debug!(code, "exiting");
    std::process::exit(code)
}

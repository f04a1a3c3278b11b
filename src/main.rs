//! Crucible demo driver.
//!
//! Seeds a small contested world, runs one battle phase to completion with
//! scripted agents, and prints the event stream as JSON lines. The seed
//! comes from the first argument, defaulting to 0, so runs are
//! reproducible.

use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

use crucible::protocol::Event;
use crucible::scripted::{demo_order, demo_world, run_round};

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let mut world = demo_world();
    let events = run_round(&mut world, demo_order(), seed);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut resolved = 0usize;
    for event in &events {
        match serde_json::to_string(event) {
            Ok(line) => writeln!(out, "{line}")?,
            Err(err) => eprintln!("{err}"),
        }
        if matches!(event, Event::Resolved { .. } | Event::CatastrophicDestruction { .. }) {
            resolved += 1;
        }
    }
    out.flush()?;
    eprintln!("{} events, {} battles resolved, seed {}", events.len(), resolved, seed);
    Ok(())
}

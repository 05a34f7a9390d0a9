//! Replays a script on the virtual clock and prints the resulting timeline.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use showflow_core::config::Config;
use showflow_core::script::{self, Script, TimelineEntry};
use tracing::info;

use super::render::format_text;
use crate::cli::OutputFormat;

pub fn run(path: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let script = Script::load(path)?;
    info!(steps = script.step.len(), "replaying {}", path.display());

    let timeline = script::simulate(&script, &config.timings);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in &timeline {
        write_entry(&mut out, format, entry)?;
    }
    out.flush().context("flush stdout")
}

fn write_entry(out: &mut impl Write, format: OutputFormat, entry: &TimelineEntry) -> Result<()> {
    let written = match format {
        OutputFormat::Text => {
            writeln!(out, "{}  <- {}", format_text(entry.at(), &entry.view), entry.cause)
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, entry).context("serialize timeline entry")?;
            writeln!(out)
        }
    };
    written.context("write timeline")
}

//! Stdout renderers for presentation views.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use showflow_core::{PresentationView, Renderer};

use crate::cli::OutputFormat;

/// One aligned line: elapsed time, surface, then the flags behind it.
pub fn format_text(elapsed: Duration, view: &PresentationView) -> String {
    format!(
        "{:>8.3}s  {:<17}  step={} error_armed={} alert={}",
        elapsed.as_secs_f64(),
        view.surface.as_str(),
        view.step.as_str(),
        view.error_armed,
        view.alert_shown,
    )
}

pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, elapsed: Duration, view: &PresentationView) -> Result<()> {
        writeln!(self.out, "{}", format_text(elapsed, view)).context("write view")?;
        self.out.flush().context("flush stdout")
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    at_ms: u64,
    view: &'a PresentationView,
}

pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, elapsed: Duration, view: &PresentationView) -> Result<()> {
        let frame = Frame {
            at_ms: elapsed.as_millis() as u64,
            view,
        };
        serde_json::to_writer(&mut self.out, &frame).context("serialize view")?;
        writeln!(self.out).context("write view")?;
        self.out.flush().context("flush stdout")
    }
}

pub fn for_format<W: Write + 'static>(format: OutputFormat, out: W) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer { out }),
        OutputFormat::Json => Box::new(JsonRenderer { out }),
    }
}

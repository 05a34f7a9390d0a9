//! Real-time host: drives the runtime, reads actions from stdin, prints views.

use std::io;

use anyhow::{Context, Result};
use showflow_core::config::Config;
use showflow_core::{FlowRuntime, HostHandle, UserAction};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{debug, info};

use super::render;
use crate::cli::OutputFormat;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let runtime = FlowRuntime::new(&config.timings);
    let handle = runtime.handle();
    let mut views = runtime.subscribe();
    let started = Instant::now();

    let mut renderer = render::for_format(format, io::stdout());
    let initial = views.borrow_and_update().clone();
    renderer.render(started.elapsed(), &initial)?;

    let presenter = tokio::spawn(runtime.run());
    let mut input = tokio::spawn(forward_commands(
        BufReader::new(tokio::io::stdin()),
        handle.clone(),
    ));
    let mut input_result: Option<Result<()>> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            changed = views.changed() => {
                // The sender goes away once the runtime has stopped.
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                renderer.render(started.elapsed(), &view)?;
            }
            joined = &mut input, if input_result.is_none() => {
                input_result = Some(joined.context("stdin reader panicked").and_then(|r| r));
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                info!("interrupted, stopping");
                if handle.quit().is_err() {
                    break;
                }
            }
        }
    }

    if input_result.is_none() {
        input.abort();
    }
    let state = presenter.await.context("presentation runtime panicked")?;
    debug!(step = state.flow.step().as_str(), "final state");
    input_result.unwrap_or(Ok(()))
}

/// Forwards input lines to the runtime until `quit`, end of input, or a read
/// error. The runtime is told to quit in every case.
async fn forward_commands<R>(reader: R, handle: HostHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let result = read_commands(reader, &handle).await;
    // The runtime may already be gone (Ctrl+C); nothing left to stop then.
    let _ = handle.quit();
    result
}

async fn read_commands<R>(reader: R, handle: &HostHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        let command = line.trim();
        match command {
            "" => {}
            "quit" | "q" | "exit" => break,
            "help" | "?" => eprintln!("{}", usage()),
            _ => match command.parse::<UserAction>() {
                Ok(action) => handle.action(action)?,
                Err(err) => eprintln!("{err}. Type 'help' for the list of actions."),
            },
        }
    }
    Ok(())
}

fn usage() -> String {
    let mut text = String::from("actions:");
    for action in UserAction::all() {
        text.push_str(&format!("\n  {:<12} ({})", action.alias(), action.name()));
    }
    text.push_str("\n  quit");
    text
}

#[cfg(test)]
mod tests {
    use showflow_core::config::TimingsConfig;

    use super::*;

    #[tokio::test]
    async fn test_read_error_is_reported_and_stops_runtime() {
        let runtime = FlowRuntime::new(&TimingsConfig::default());
        let handle = runtime.handle();
        let presenter = tokio::spawn(runtime.run());

        // Invalid UTF-8 makes the line reader fail after the first command.
        let input: &[u8] = b"tap\n\xff\xfe\n";
        let err = forward_commands(input, handle).await.unwrap_err();

        assert!(format!("{err:#}").contains("read stdin"), "{err:#}");
        presenter.await.unwrap();
    }

    #[tokio::test]
    async fn test_end_of_input_stops_runtime() {
        let runtime = FlowRuntime::new(&TimingsConfig::default());
        let handle = runtime.handle();
        let presenter = tokio::spawn(runtime.run());

        forward_commands(&b"dismiss\n\n"[..], handle).await.unwrap();

        presenter.await.unwrap();
    }

    #[test]
    fn test_usage_lists_every_alias() {
        let text = usage();
        for action in UserAction::all() {
            assert!(text.contains(action.alias()), "{text}");
        }
        assert!(text.ends_with("quit"));
    }
}

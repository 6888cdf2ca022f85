use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, writer::BoxMakeWriter},
    prelude::*,
};

/// Console writer that hands formatted log lines to the UI manager so they are printed
/// above the progress bars instead of through them.
struct UiLogWriter {
    sender: mpsc::Sender<UiEvent>,
}

impl Write for UiLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf).trim_end().to_string();
        if let Err(e) = self.sender.try_send(UiEvent::Log(line)) {
            // UI gone or saturated; the line still has to go somewhere.
            let UiEvent::Log(line) = e.into_inner() else {
                return Ok(buf.len());
            };
            eprintln!("{}", line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

pub fn setup_logging(
    verbosity: u8,
    quiet: bool,
    log_file: Option<&Path>,
    ui_sender: Option<mpsc::Sender<UiEvent>>,
) -> Result<()> {
    let console_writer = match ui_sender {
        Some(sender) => BoxMakeWriter::new(move || UiLogWriter {
            sender: sender.clone(),
        }),
        None => BoxMakeWriter::new(io::stderr),
    };

    let console_layer = fmt::layer()
        .with_writer(console_writer)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(console_layer);

    let installed = if let Some(path) = log_file {
        let file = File::create(path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

use anyhow::{Context, Result};
use clap::ValueEnum;
use instant_weather_core::{Status, StatusPresenter};
use serde::Serialize;
use std::io::Write;

/// Status line formats understood by common bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// waybar `custom` module with `return-type: json`.
    #[default]
    Json,
    /// Text only, one line per update.
    Plain,
    /// i3bar / swaybar protocol with click events.
    I3bar,
}

const I3BAR_HEADER: &str = r#"{"version":1,"click_events":true}"#;

/// One block of the i3bar protocol.
#[derive(Serialize)]
struct I3Block<'a> {
    name: &'static str,
    full_text: &'a str,
}

/// Writes each status as one line.
pub struct StdoutPresenter<W> {
    out: W,
    format: OutputFormat,
    started: bool,
}

impl<W: Write + Send> StdoutPresenter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            started: false,
        }
    }

    fn line(&self, status: &Status) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string(status)?,
            OutputFormat::Plain => status.text.clone(),
            OutputFormat::I3bar => {
                let block = I3Block {
                    name: "instant_weather",
                    full_text: &status.text,
                };
                format!("{},", serde_json::to_string(&[block])?)
            }
        })
    }
}

impl<W: Write + Send> StatusPresenter for StdoutPresenter<W> {
    fn show(&mut self, status: &Status) -> Result<()> {
        if !self.started && self.format == OutputFormat::I3bar {
            writeln!(self.out, "{I3BAR_HEADER}\n[").context("Failed to write i3bar header")?;
        }
        self.started = true;

        let line = self.line(status)?;
        writeln!(self.out, "{line}").context("Failed to write status line")?;
        // Bars read line by line, so never leave a status in the buffer.
        self.out.flush().context("Failed to flush status line")?;
        Ok(())
    }
}

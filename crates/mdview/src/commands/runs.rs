//! `mdview runs` command implementation.

use std::fmt::Write;

use clap::Args;
use mdview::StyledDocument;
use mdview_config::CliSettings;

use super::InputArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the runs command.
#[derive(Args)]
pub(crate) struct RunsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print the styled document as JSON.
    #[arg(long)]
    json: bool,
}

impl RunsArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let markdown = self.input.markdown(CliSettings::default())?;
        let styled = markdown.render_rich_text(&self.input.read_source()?);

        if self.json {
            output.line(&serde_json::to_string_pretty(&styled)?)?;
        } else {
            output.write(&format_runs(&styled)?)?;
        }
        Ok(())
    }
}

/// One line per run: byte range, quoted text, attributes as compact JSON.
/// Attachments follow, one per line.
fn format_runs(styled: &StyledDocument) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for run in styled.runs() {
        let text = &styled.text()[run.range.clone()];
        let attributes = serde_json::to_string(&run.attributes)?;
        writeln!(out, "{}..{} {text:?} {attributes}", run.range.start, run.range.end).unwrap();
    }
    for attachment in styled.attachments() {
        writeln!(out, "[{}] {}", attachment.id, attachment.source).unwrap();
    }
    Ok(out)
}

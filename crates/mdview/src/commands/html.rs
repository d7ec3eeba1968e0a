//! `mdview html` command implementation.

use clap::Args;
use mdview_config::CliSettings;

use super::InputArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the html command.
#[derive(Args)]
pub(crate) struct HtmlArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Add begin-line/end-line attributes to block elements (overrides config).
    #[arg(long)]
    line_ranges: bool,

    /// Add id anchors to headings (overrides config).
    #[arg(long)]
    anchors: bool,

    /// Wrap the fragment in a JSON object.
    #[arg(long)]
    json: bool,
}

impl HtmlArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let markdown = self.input.markdown(CliSettings {
            emit_line_ranges: self.line_ranges.then_some(true),
            heading_anchors: self.anchors.then_some(true),
            ..CliSettings::default()
        })?;
        let html = markdown.render_html(&self.input.read_source()?);

        if self.json {
            let json = serde_json::json!({ "html": html });
            output.line(&serde_json::to_string_pretty(&json)?)?;
        } else {
            output.write(&html)?;
        }
        Ok(())
    }
}

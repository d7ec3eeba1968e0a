//! `mdview outline` command implementation.

use clap::Args;
use mdview::OutlineToken;
use mdview_config::CliSettings;

use super::InputArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the outline command.
#[derive(Args)]
pub(crate) struct OutlineArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print tokens as JSON.
    #[arg(long)]
    json: bool,
}

impl OutlineArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let markdown = self.input.markdown(CliSettings::default())?;
        let tokens = markdown.extract_outline(&self.input.read_source()?);

        if self.json {
            output.line(&serde_json::to_string_pretty(&tokens)?)?;
        } else if tokens.is_empty() {
            output.note("No headings found");
        } else {
            for token in &tokens {
                output.line(&format_token(token))?;
            }
        }
        Ok(())
    }
}

/// `  Title #anchor`, indented two spaces per level below 1.
fn format_token(token: &OutlineToken) -> String {
    let indent = "  ".repeat(usize::from(token.level.saturating_sub(1)));
    format!("{indent}{} #{}", token.text, token.anchor)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_format_token() {
        let tokens = mdview::Markdown::new().extract_outline("# Guide\n\n### Deep Dive\n");
        let lines: Vec<_> = tokens.iter().map(format_token).collect();
        assert_eq!(lines, vec!["Guide #guide", "    Deep Dive #deep-dive"]);
    }
}

//! `mdview tree` command implementation.

use clap::Args;
use mdview_config::CliSettings;

use super::InputArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    input: InputArgs,
}

impl TreeArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let markdown = self.input.markdown(CliSettings::default())?;
        let document = markdown.parse(&self.input.read_source()?);
        output.write(&document.dump())?;
        Ok(())
    }
}

//! CLI command implementations.

mod html;
mod outline;
mod runs;
mod tree;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use mdview::{Markdown, RenderOptions};
use mdview_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use html::HtmlArgs;
pub(crate) use outline::OutlineArgs;
pub(crate) use runs::RunsArgs;
pub(crate) use tree::TreeArgs;

/// Input selection shared by every command.
#[derive(Args)]
pub(crate) struct InputArgs {
    /// Markdown file to render (default: stdin, also `-`).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log the parsed document tree (visible with RUST_LOG=debug).
    #[arg(long)]
    debug: bool,
}

impl InputArgs {
    /// Read the Markdown source.
    fn read_source(&self) -> Result<String, CliError> {
        match self.input.as_deref() {
            Some(path) if path != Path::new("-") => {
                std::fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => {
                let mut source = String::new();
                std::io::stdin().read_to_string(&mut source)?;
                Ok(source)
            }
        }
    }

    /// Load configuration and build the renderer.
    fn markdown(&self, settings: CliSettings) -> Result<Markdown, CliError> {
        let settings = CliSettings {
            debug: self.debug.then_some(true),
            ..settings
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "using configuration");
        }
        Ok(markdown_from_config(&config))
    }
}

fn markdown_from_config(config: &Config) -> Markdown {
    Markdown::new()
        .with_style_sheet(config.style_sheet())
        .with_options(RenderOptions {
            debug: config.render.debug,
            emit_line_ranges: config.render.emit_line_ranges,
            heading_anchors: config.render.heading_anchors,
        })
}

//! ImageMagick-backed channel editor

use crate::command::{self, ToolCommand};
use crate::tools::{ChannelEditor, EditOp};
use crate::Result;

/// Runs ImageMagick (`magick` on macOS, `convert` elsewhere) for each edit
#[derive(Debug, Clone)]
pub struct MagickEditor {
    program: String,
}

impl MagickEditor {
    /// Uses the platform's default ImageMagick entry point
    pub fn new() -> Self {
        let program = if cfg!(target_os = "macos") {
            "magick"
        } else {
            "convert"
        };
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Checks that the configured program can be spawned
    pub fn is_available(&self) -> bool {
        command::is_on_path(&self.program)
    }

    pub fn command(&self, op: &EditOp) -> ToolCommand {
        let cmd = ToolCommand::new(&self.program);
        match op {
            EditOp::RemoveAlpha { input, output } => cmd
                .arg(input)
                .args(["-background", "black", "-alpha", "remove"])
                .arg(output),
            EditOp::SeparateAlpha { input, output } => cmd
                .arg(input)
                .args(["-channel", "A", "-separate"])
                .arg(output),
            EditOp::Append {
                left,
                right,
                output,
            } => cmd.arg(left).arg(right).arg("+append").arg(output),
        }
    }
}

impl Default for MagickEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelEditor for MagickEditor {
    fn apply(&self, op: &EditOp) -> Result<()> {
        self.command(op).run()
    }
}

//! ALV CLI Tool
//!
//! Command-line interface for converting alpha videos and frame directories
//! into alpha-strip videos, and for restoring RGBA frames from them.

use alv_core::PackMode;
use alv_decoder::{FrameRestorer, StripLayout};
use alv_encoder::ffmpeg::{self, FfmpegEncoder, FfmpegExtractor};
use alv_encoder::{
    BuiltinEditor, ChannelEditor, FramePipeline, MagickEditor, PipelineConfig, RunSummary,
};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alv")]
#[command(about = "ALV (Alpha-to-Luma Video) - carries the alpha channel as a visible strip next to the picture")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").args(["file", "dir"])))]
struct ConvertArgs {
    /// Input video file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Directory of RGBA frames
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Pack the alpha mask to a third of its width
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = parse_bool,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    zip: bool,

    /// Mask packing layout used with --zip
    #[arg(long, value_enum, default_value_t = PackModeArg::Tiled)]
    pack_mode: PackModeArg,

    /// Output frame rate
    #[arg(long, default_value_t = 25)]
    fps: u32,

    /// Video bitrate in kbps
    #[arg(long, default_value_t = 2000)]
    bitrate: u32,

    /// Channel editor used for the per-frame edits
    #[arg(long, value_enum, default_value_t = EditorArg::Magick)]
    editor: EditorArg,

    /// Frames processed concurrently (0 = one per CPU)
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Frame file extension to pick up, can be repeated
    #[arg(long = "ext", default_value = "png")]
    extensions: Vec<String>,
}

impl ConvertArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            fps: self.fps,
            bitrate_kbps: self.bitrate,
            pack: self.zip.then(|| self.pack_mode.into()),
            workers: self.workers,
            extensions: self.extensions.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Restore an RGBA frame from a composed frame
    Restore {
        /// Composed frame, mask strip on the left
        input: PathBuf,

        /// Output image (PNG keeps the alpha channel)
        #[arg(short, long)]
        output: PathBuf,

        /// Width of the original frame
        #[arg(long)]
        width: u32,

        /// Packing layout of the mask strip, if it was packed
        #[arg(long, value_enum)]
        packed: Option<PackModeArg>,

        /// Keep colors premultiplied over black
        #[arg(long)]
        premultiplied: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PackModeArg {
    Linear,
    Tiled,
}

impl From<PackModeArg> for PackMode {
    fn from(mode: PackModeArg) -> Self {
        match mode {
            PackModeArg::Linear => PackMode::Linear,
            PackModeArg::Tiled => PackMode::Tiled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EditorArg {
    /// ImageMagick (`magick` on macOS, `convert` elsewhere)
    Magick,
    /// In-process editor, no external tool needed
    Builtin,
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got '{value}'")),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Restore {
            input,
            output,
            width,
            packed,
            premultiplied,
        }) => restore_frame(&input, &output, width, packed, premultiplied),
        None => convert(&cli.convert),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn convert(args: &ConvertArgs) -> Result<()> {
    if args.file.is_none() && args.dir.is_none() {
        println!("Nothing to convert: pass --file <video> or --dir <frames directory>");
        return Ok(());
    }

    let config = args.pipeline_config();
    match args.editor {
        EditorArg::Magick => {
            let editor = MagickEditor::new();
            if !editor.is_available() {
                bail!(
                    "ImageMagick ({}) was not found on PATH, install it or use --editor builtin",
                    editor.program()
                );
            }
            run_pipeline(config, editor, args)
        }
        EditorArg::Builtin => run_pipeline(config, BuiltinEditor, args),
    }
}

fn run_pipeline<C: ChannelEditor>(
    config: PipelineConfig,
    editor: C,
    args: &ConvertArgs,
) -> Result<()> {
    if !ffmpeg::is_available() {
        bail!("ffmpeg is required for video encoding, but was not found on PATH");
    }

    println!("Alpha packing: {}", if config.pack.is_some() { "on" } else { "off" });
    let pipeline = FramePipeline::new(config, FfmpegExtractor, editor, FfmpegEncoder);

    let summary = match (&args.file, &args.dir) {
        (Some(file), _) => {
            println!("Converting video: {}", file.display());
            let work_dir = std::env::current_dir().context("Failed to resolve working directory")?;
            pipeline
                .run_video(file, &work_dir)
                .context("Failed to convert video")?
        }
        (None, Some(dir)) => {
            println!("Converting image directory: {}", dir.display());
            pipeline
                .run_dir(dir)
                .context("Failed to convert image directory")?
        }
        (None, None) => return Ok(()),
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if !summary.is_complete() {
        println!(
            "{} of {} frames failed and were skipped:",
            summary.failures.len(),
            summary.frames
        );
        for failure in &summary.failures {
            println!("  [{}] {}: {}", failure.index, failure.name, failure.error);
        }
    }

    println!(
        "Converted {} frames, video file path is: {}",
        summary.encoded,
        summary.output.display()
    );
}

fn restore_frame(
    input: &Path,
    output: &Path,
    width: u32,
    packed: Option<PackModeArg>,
    premultiplied: bool,
) -> Result<()> {
    let layout = match packed {
        Some(mode) => StripLayout::packed(width, mode.into()),
        None => StripLayout::unpacked(width),
    };

    println!("Restoring frame: {}", input.display());
    FrameRestorer::new(layout)
        .with_unpremultiply(!premultiplied)
        .restore_file(input, output)
        .context("Failed to restore frame")?;
    println!("Saved frame to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("alv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--dir", "frames"]);
        let config = cli.convert.pipeline_config();

        assert_eq!(cli.convert.dir, Some(PathBuf::from("frames")));
        assert_eq!(config.fps, 25);
        assert_eq!(config.bitrate_kbps, 2000);
        assert_eq!(config.pack, None);
        assert_eq!(config.workers, 1);
        assert_eq!(config.extensions, vec!["png".to_string()]);
        assert_eq!(cli.convert.editor, EditorArg::Magick);
    }

    #[test]
    fn test_zip_flag_forms() {
        assert!(parse(&["--dir", "d", "--zip"]).convert.zip);
        assert!(parse(&["--zip", "--dir", "d"]).convert.zip);
        assert!(parse(&["--dir", "d", "--zip", "yes"]).convert.zip);
        assert!(parse(&["--dir", "d", "--zip", "True"]).convert.zip);
        assert!(!parse(&["--dir", "d", "--zip", "0"]).convert.zip);
        assert!(Cli::try_parse_from(["alv", "--dir", "d", "--zip", "maybe"]).is_err());
    }

    #[test]
    fn test_zip_uses_pack_mode() {
        let cli = parse(&["--file", "a.mov", "--zip", "--pack-mode", "linear"]);
        assert_eq!(cli.convert.pipeline_config().pack, Some(PackMode::Linear));

        let cli = parse(&["--file", "a.mov", "--zip"]);
        assert_eq!(cli.convert.pipeline_config().pack, Some(PackMode::Tiled));
    }

    #[test]
    fn test_file_and_dir_conflict() {
        assert!(Cli::try_parse_from(["alv", "--file", "a.mov", "--dir", "d"]).is_err());
    }

    #[test]
    fn test_no_input_is_not_a_parse_error() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(cli.convert.file.is_none() && cli.convert.dir.is_none());
        convert(&cli.convert).unwrap();
    }

    #[test]
    fn test_custom_options() {
        let cli = parse(&[
            "--dir", "d", "--fps", "30", "--bitrate", "4000", "--workers", "0", "--ext", "png",
            "--ext", "tga", "--editor", "builtin",
        ]);
        let config = cli.convert.pipeline_config();
        assert_eq!(config.fps, 30);
        assert_eq!(config.bitrate_kbps, 4000);
        assert_eq!(config.workers, 0);
        assert_eq!(config.extensions, vec!["png".to_string(), "tga".to_string()]);
        assert_eq!(cli.convert.editor, EditorArg::Builtin);
    }

    #[test]
    fn test_restore_subcommand() {
        let cli = parse(&[
            "restore", "00000.jpg", "-o", "out.png", "--width", "100", "--packed", "tiled",
        ]);
        match cli.command {
            Some(Commands::Restore {
                input,
                output,
                width,
                packed,
                premultiplied,
            }) => {
                assert_eq!(input, PathBuf::from("00000.jpg"));
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(width, 100);
                assert_eq!(packed, Some(PackModeArg::Tiled));
                assert!(!premultiplied);
            }
            None => panic!("expected restore subcommand"),
        }
    }
}

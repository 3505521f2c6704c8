use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use kitsniff_frame::{ExtractorConfig, FrameLayout, ReaderConfig, DEFAULT_MAX_LINE_LEN};
use kitsniff_transport::DEFAULT_BAUD_RATE;

use crate::exit::CliResult;
use crate::output::OutputFormat;
use crate::pipeline::PipelineOptions;

pub mod capture;
pub mod decode;
pub mod replay;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one 802.15.4 payload given as hex.
    Decode(DecodeArgs),
    /// Extract and decode frames from a raw capture file.
    Replay(ReplayArgs),
    /// Capture from one or more kits until Ctrl-C.
    Capture(CaptureArgs),
    /// Send a CLI command to a kit.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Capture(args) => capture::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LayoutArg {
    #[default]
    Canonical,
    /// Older firmware without kit timestamps.
    Legacy,
}

impl From<LayoutArg> for FrameLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Canonical => FrameLayout::Canonical,
            LayoutArg::Legacy => FrameLayout::Legacy,
        }
    }
}

/// Options shared by every command that reads a kit byte stream.
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Binary frame layout the kit firmware emits.
    #[arg(long, value_enum, default_value = "canonical", env = "KITSNIFF_LAYOUT")]
    pub layout: LayoutArg,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
    /// Print only TX/RX events, not CLI text lines.
    #[arg(long)]
    pub skip_text: bool,
    /// Longest unterminated text kept while resyncing; older bytes are dropped.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE_LEN)]
    pub max_line_len: usize,
}

impl StreamArgs {
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            extractor: ExtractorConfig {
                layout: self.layout.into(),
                max_line_len: self.max_line_len,
            },
            ..ReaderConfig::default()
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            count: self.count,
            skip_text: self.skip_text,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Payload bytes as hex (whitespace around it is ignored).
    pub hex: String,
    /// Channel the payload was seen on; selects the PHY header size.
    #[arg(long, short = 'c', default_value = "11")]
    pub channel: u8,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Raw byte capture of a kit's serial output.
    pub file: PathBuf,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Serial ports to capture from (e.g. /dev/ttyACM0 COM3).
    #[arg(required = true, num_args = 1..)]
    pub ports: Vec<String>,
    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE, env = "KITSNIFF_BAUD")]
    pub baud: u32,
    /// CLI command sent to every kit after connecting (e.g. "unique").
    #[arg(long, value_name = "COMMAND")]
    pub init_command: Option<String>,
    #[command(flatten)]
    pub stream: StreamArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port of the kit.
    pub port: String,
    /// Command text, sent with a trailing CRLF.
    pub command: String,
    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE, env = "KITSNIFF_BAUD")]
    pub baud: u32,
    /// Print the kit's response up to its next prompt.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the prompt when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "2s")]
    pub wait_timeout: String,
    /// Binary frame layout the kit firmware emits.
    #[arg(long, value_enum, default_value = "canonical", env = "KITSNIFF_LAYOUT")]
    pub layout: LayoutArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details and enabled features.
    #[arg(long)]
    pub extended: bool,
}

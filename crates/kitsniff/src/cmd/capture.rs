use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kitsniff_frame::{CommandWriter, FrameReader, ReaderConfig};
use kitsniff_transport::{KitStream, LinkConfig, SerialLink};
use tracing::{info, warn};

use crate::cmd::CaptureArgs;
use crate::exit::{
    frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS, TRANSPORT_ERROR,
};
use crate::output::OutputFormat;
use crate::pipeline;

pub fn run(args: CaptureArgs, format: OutputFormat) -> CliResult<i32> {
    let link_config = LinkConfig {
        baud_rate: args.baud,
        ..LinkConfig::default()
    };

    let mut readers = Vec::with_capacity(args.ports.len());
    for port in &args.ports {
        let link = SerialLink::open_with_config(port, &link_config)
            .map_err(|err| transport_error(&format!("cannot open {port}"), err))?;
        if let Some(command) = &args.init_command {
            send_init_command(&link, command)?;
        }
        let reader = attach(link, args.stream.reader_config(), &link_config)?;
        readers.push((port.clone(), reader));
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let summary = pipeline::run(readers, args.stream.pipeline_options(), format, running)?;
    info!(printed = summary.printed, "capture stopped");

    if summary.failed_ports.is_empty() {
        Ok(SUCCESS)
    } else {
        warn!(ports = ?summary.failed_ports, "some kits dropped during capture");
        Ok(TRANSPORT_ERROR)
    }
}

fn send_init_command(link: &KitStream, command: &str) -> CliResult<()> {
    let clone = link
        .try_clone()
        .map_err(|err| transport_error("cannot clone link", err))?;
    let mut writer = CommandWriter::new(clone);
    writer
        .send_command(command)
        .map_err(|err| frame_error(&format!("cannot send {command:?}"), err))
}

fn attach(
    link: KitStream,
    config: ReaderConfig,
    link_config: &LinkConfig,
) -> CliResult<FrameReader<KitStream>> {
    FrameReader::with_link(link, config, Some(link_config.read_timeout))
        .map_err(|err| frame_error("cannot attach reader", err))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use kitsniff_frame::FrameReader;
use kitsniff_transport::ReplayFile;
use tracing::info;

use crate::cmd::ReplayArgs;
use crate::exit::{transport_error, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;
use crate::pipeline;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let link = ReplayFile::open(&args.file)
        .map_err(|err| transport_error(&format!("cannot open {}", args.file.display()), err))?;
    let name = link.name().to_string();
    let reader = FrameReader::with_config(link, args.stream.reader_config());

    let summary = pipeline::run(
        vec![(name, reader)],
        args.stream.pipeline_options(),
        format,
        Arc::new(AtomicBool::new(true)),
    )?;

    for (port, stats) in &summary.stats {
        info!(
            port = %port,
            printed = summary.printed,
            text = stats.text_frames,
            tx = stats.tx_frames,
            rx = stats.rx_frames,
            noise = stats.noise_bytes,
            discarded = stats.discarded_bytes,
            "replay finished"
        );
    }

    if summary.failed_ports.is_empty() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

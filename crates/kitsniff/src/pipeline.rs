use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use kitsniff_decode::PacketAnalyzer;
use kitsniff_frame::{ExtractorStats, FrameError, FrameReader};
use tracing::{debug, info, info_span, warn};

use crate::exit::{CliError, CliResult, INTERNAL};
use crate::output::{print_record, OutputFormat};
use crate::record::CapturedRecord;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the printing side of a capture wants.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Stop after this many printed records.
    pub count: Option<usize>,
    /// Drop CLI text lines instead of printing them.
    pub skip_text: bool,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Record(CapturedRecord),
    Closed { port: String, error: Option<String> },
}

#[derive(Debug, Default)]
pub struct Summary {
    pub printed: usize,
    pub failed_ports: Vec<String>,
    pub stats: Vec<(String, ExtractorStats)>,
}

/// Drive one reader on its own thread until the link closes, fails, or
/// `running` is cleared. Read timeouts only re-check `running`.
pub fn spawn_worker<T>(
    port: String,
    mut reader: FrameReader<T>,
    events: Sender<WorkerEvent>,
    running: Arc<AtomicBool>,
) -> CliResult<JoinHandle<ExtractorStats>>
where
    T: Read + Send + 'static,
{
    let thread_name = format!("kit:{port}");
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || {
            let _span = info_span!("worker", port = %port).entered();
            let analyzer = PacketAnalyzer::new();
            info!(port = %port, "capture worker started");

            let mut error = None;
            while running.load(Ordering::SeqCst) {
                match reader.read_frame() {
                    Ok(frame) => {
                        let record = CapturedRecord::from_frame(&port, &frame, &analyzer);
                        if events.send(WorkerEvent::Record(record)).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.is_timeout() => continue,
                    Err(FrameError::ConnectionClosed) => {
                        info!(port = %port, "link closed");
                        break;
                    }
                    Err(err) => {
                        warn!(port = %port, error = %err, "capture worker dropped");
                        error = Some(err.to_string());
                        break;
                    }
                }
            }

            let stats = reader.extractor().stats();
            debug!(port = %port, ?stats, "capture worker finished");
            let _ = events.send(WorkerEvent::Closed { port, error });
            stats
        })
        .map_err(|err| CliError::new(INTERNAL, format!("failed to spawn worker: {err}")))
}

/// Run one worker per reader and print their records as they arrive, in
/// arrival order. Returns once every worker has closed, the record limit is
/// hit, or `running` is cleared.
pub fn run<T>(
    readers: Vec<(String, FrameReader<T>)>,
    options: PipelineOptions,
    format: OutputFormat,
    running: Arc<AtomicBool>,
) -> CliResult<Summary>
where
    T: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::with_capacity(readers.len());
    for (port, reader) in readers {
        let handle = spawn_worker(port.clone(), reader, tx.clone(), running.clone())?;
        handles.push((port, handle));
    }
    drop(tx);

    let mut summary = Summary::default();
    let mut open = handles.len();

    while open > 0 {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(WorkerEvent::Record(record)) => {
                if options.skip_text && record.is_text() {
                    continue;
                }
                print_record(&record, format);
                summary.printed += 1;
                if options.count.is_some_and(|limit| summary.printed >= limit) {
                    break;
                }
            }
            Ok(WorkerEvent::Closed { port, error }) => {
                open -= 1;
                if error.is_some() {
                    summary.failed_ports.push(port);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::SeqCst);
    for (port, handle) in handles {
        match handle.join() {
            Ok(stats) => summary.stats.push((port, stats)),
            Err(_) => {
                warn!(port = %port, "capture worker panicked");
                summary.failed_ports.push(port);
            }
        }
    }

    Ok(summary)
}

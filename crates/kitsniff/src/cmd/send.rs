use std::io::Read;
use std::time::{Duration, Instant};

use kitsniff_decode::PacketAnalyzer;
use kitsniff_frame::{
    CommandWriter, ExtractorConfig, FrameError, FrameReader, RawFrame, ReaderConfig,
};
use kitsniff_transport::{LinkConfig, SerialLink};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_record, OutputFormat};
use crate::record::CapturedRecord;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let link_config = LinkConfig {
        baud_rate: args.baud,
        ..LinkConfig::default()
    };
    let link = SerialLink::open_with_config(&args.port, &link_config)
        .map_err(|err| transport_error(&format!("cannot open {}", args.port), err))?;

    let mut writer = CommandWriter::new(
        link.try_clone()
            .map_err(|err| transport_error("cannot clone link", err))?,
    );
    writer
        .send_command(&args.command)
        .map_err(|err| frame_error("send failed", err))?;

    if args.wait {
        let config = ReaderConfig {
            extractor: ExtractorConfig {
                layout: args.layout.into(),
                ..ExtractorConfig::default()
            },
            ..ReaderConfig::default()
        };
        let mut reader = FrameReader::with_link(link, config, Some(link_config.read_timeout))
            .map_err(|err| frame_error("cannot attach reader", err))?;
        let analyzer = PacketAnalyzer::new();
        let port = args.port.clone();
        wait_for_prompt(&mut reader, wait_timeout, |frame| {
            print_record(&CapturedRecord::from_frame(&port, frame, &analyzer), format);
        })?;
    }

    Ok(SUCCESS)
}

/// Hand every frame to `on_frame` until the kit prints its `"> "` prompt.
/// Events the kit emits meanwhile are passed through too.
fn wait_for_prompt<R, F>(
    reader: &mut FrameReader<R>,
    timeout: Duration,
    mut on_frame: F,
) -> CliResult<usize>
where
    R: Read,
    F: FnMut(&RawFrame),
{
    let deadline = Instant::now() + timeout;
    let mut seen = 0usize;
    loop {
        match reader.read_frame() {
            Ok(frame) => {
                seen += 1;
                on_frame(&frame);
                if matches!(&frame, RawFrame::Text(line) if line.is_prompt()) {
                    return Ok(seen);
                }
            }
            Err(err) if err.is_timeout() => {}
            Err(FrameError::ConnectionClosed) => return Ok(seen),
            Err(err) => return Err(frame_error("receive failed", err)),
        }
        if Instant::now() >= deadline {
            return Err(CliError::new(
                TIMEOUT,
                format!("no prompt within {}ms", timeout.as_millis()),
            ));
        }
    }
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn wait_stops_at_prompt() {
        let stream = b"ok\r\nchannel 15\r\n> ignored\r\n".to_vec();
        let mut reader = FrameReader::new(Cursor::new(stream));
        let mut lines = Vec::new();
        let seen = wait_for_prompt(&mut reader, Duration::from_secs(1), |frame| {
            if let RawFrame::Text(line) = frame {
                lines.push(line.text().into_owned());
            }
        })
        .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(lines, vec!["ok", "channel 15", ">"]);
    }

    #[test]
    fn wait_returns_on_close_without_prompt() {
        let mut reader = FrameReader::new(Cursor::new(b"partial".to_vec()));
        let seen = wait_for_prompt(&mut reader, Duration::from_secs(1), |_| {}).unwrap();
        assert_eq!(seen, 0);
    }

    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_millis(5));
            Err(io::Error::from(io::ErrorKind::TimedOut))
        }
    }

    #[test]
    fn wait_times_out_on_quiet_kit() {
        let mut reader = FrameReader::new(Silent);
        let err = wait_for_prompt(&mut reader, Duration::from_millis(20), |_| {}).unwrap_err();
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration(" ").is_err());
    }
}

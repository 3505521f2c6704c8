use kitsniff_decode::{AnalysisReport, PacketAnalyzer};

use crate::cmd::DecodeArgs;
use crate::exit::{decode_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_packet, print_report, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let result = PacketAnalyzer::new().analyze_hex(&args.hex, args.channel);

    // JSON consumers get the error inside the report instead of on stderr.
    if let OutputFormat::Json = format {
        let report = AnalysisReport::from_result(&args.hex, result);
        print_report(&report);
        return Ok(exit_code(&report));
    }

    let packet = result.map_err(|err| decode_error("decode failed", err))?;
    print_packet(&packet, format);
    Ok(SUCCESS)
}

fn exit_code(report: &AnalysisReport) -> i32 {
    if report.is_error() {
        DATA_INVALID
    } else {
        SUCCESS
    }
}

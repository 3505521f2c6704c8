use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use kitsniff_decode::{AnalysisReport, DecodedPacket, Layer};
use serde::Serialize;

use crate::record::CapturedRecord;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_record(record: &CapturedRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "PORT", "KIND", "CH", "STATUS", "RSSI", "LQI", "LEN", "LAYERS",
                ])
                .add_row(vec![
                    record.port.clone(),
                    record.kind.to_string(),
                    opt(record.channel),
                    record.status.unwrap_or("-").to_string(),
                    opt(record.rssi),
                    opt(record.lqi),
                    opt(record.decoded.as_ref().map(|p| p.total_length)),
                    summary(record),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if let Some(text) = &record.text {
                println!("{} text: {text}", record.port);
                return;
            }
            print!("{} {}", record.port, record.kind);
            if let Some(addr) = &record.kit_address {
                print!(" kit={addr}");
            }
            if let Some(ch) = record.channel {
                print!(" ch={ch}");
            }
            if let (Some(code), Some(status)) = (record.error_code, record.status) {
                print!(" status={status} ({code})");
            }
            if let (Some(rssi), Some(lqi)) = (record.rssi, record.lqi) {
                print!(" rssi={rssi} lqi={lqi}");
            }
            if let Some(crc) = record.crc_passed {
                print!(" crc={}", if crc { "ok" } else { "bad" });
            }
            println!();
            if let Some(packet) = &record.decoded {
                print_layers_pretty(&packet.layers, 1);
            }
        }
        OutputFormat::Raw => {
            if let Some(packet) = &record.decoded {
                print_raw(&packet.raw);
            } else if let Some(text) = &record.text {
                print_raw(format!("{text}\n").as_bytes());
            }
        }
    }
}

/// Decode results for JSON consumers: a failure travels inside the report.
pub fn print_report(report: &AnalysisReport) {
    print_json(report);
}

pub fn print_packet(packet: &DecodedPacket, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(packet),
        OutputFormat::Table => print_layers_table(&packet.layers),
        OutputFormat::Pretty => {
            println!("{} ({} bytes)", packet.raw_hex(), packet.total_length);
            print_layers_pretty(&packet.layers, 1);
        }
        OutputFormat::Raw => print_raw(&packet.raw),
    }
}

fn print_layers_table(layers: &[Layer]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["LAYER", "FIELD", "VALUE", "DESCRIPTION", "BITS"]);

    for layer in layers {
        table.add_row(vec![
            format!("{} ({} bytes)", layer.name, layer.total_bytes),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ]);
        for field in &layer.fields {
            table.add_row(vec![
                String::new(),
                field.name.to_string(),
                field.value.clone(),
                field.description.clone(),
                String::new(),
            ]);
            for sub in field.subfields() {
                table.add_row(vec![
                    String::new(),
                    format!("  {}", sub.name),
                    sub.value.to_string(),
                    sub.description.clone(),
                    sub.bits.clone(),
                ]);
            }
        }
    }
    println!("{table}");
}

fn print_layers_pretty(layers: &[Layer], indent: usize) {
    let pad = "  ".repeat(indent);
    for layer in layers {
        println!("{pad}{} ({} bytes)", layer.name, layer.total_bytes);
        for field in &layer.fields {
            if field.description.is_empty() {
                println!("{pad}  {}: {}", field.name, field.value);
            } else {
                println!("{pad}  {}: {} {}", field.name, field.value, field.description);
            }
            for sub in field.subfields() {
                println!("{pad}    {}  {}: {}", sub.bits, sub.name, sub.description);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn summary(record: &CapturedRecord) -> String {
    if let Some(text) = &record.text {
        return text.clone();
    }
    record
        .decoded
        .as_ref()
        .map(|p| p.layers.iter().map(|l| l.name).collect::<Vec<_>>().join(" / "))
        .unwrap_or_default()
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

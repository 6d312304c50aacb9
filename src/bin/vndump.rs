//! Replay a raw serial capture through the decode pipeline.
//!
//! Prints one JSON object per accepted sample to stdout and a summary to
//! stderr. Bytes that cannot be framed or that fail validation are skipped
//! with resynchronization on the next frame start.

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use vn100::config::{OutputConfig, OutputMode};
use vn100::decoder::Decoder;
use vn100::packet::{RawPacket, SYNC_BYTE};
use vn100::sync::{SyncInfo, DEFAULT_PULSE_WIDTH_US, DEFAULT_SYNC_RATE};

struct Stats {
    accepted: u64,
    rejected: u64,
    skipped_bytes: usize,
}

fn find_sync(data: &[u8], start: usize) -> Option<usize> {
    (start..data.len()).find(|&i| data[i] == SYNC_BYTE)
}

fn dump_binary(data: &[u8], decoder: &mut Decoder, out: &mut impl Write) -> io::Result<Stats> {
    let mut stats = Stats { accepted: 0, rejected: 0, skipped_bytes: 0 };
    let frame_len = decoder.config().binary_frame_len();

    let mut pos = 0;
    while let Some(sync) = find_sync(data, pos) {
        stats.skipped_bytes += sync - pos;
        if sync + frame_len > data.len() {
            stats.skipped_bytes += data.len() - sync;
            break;
        }

        let frame = &data[sync..sync + frame_len];
        let decoded = RawPacket::decode(frame).and_then(|pkt| decoder.decode(&pkt));
        match decoded {
            Ok(stamped) => {
                let line = serde_json::to_string(&stamped).expect("sample serializes");
                writeln!(out, "{line}")?;
                stats.accepted += 1;
                pos = sync + frame_len;
            }
            Err(_) => {
                // resynchronize one byte past this candidate
                stats.rejected += 1;
                stats.skipped_bytes += 1;
                pos = sync + 1;
            }
        }
    }
    Ok(stats)
}

fn dump_ascii(data: &[u8], decoder: &mut Decoder, out: &mut impl Write) -> io::Result<Stats> {
    let mut stats = Stats { accepted: 0, rejected: 0, skipped_bytes: 0 };

    for line in data.split(|&b| b == b'\n') {
        if line.is_empty() {
            continue;
        }
        let Some(start) = line.iter().position(|&b| b == b'$') else {
            stats.skipped_bytes += line.len();
            continue;
        };
        stats.skipped_bytes += start;

        let decoded = RawPacket::decode(&line[start..]).and_then(|pkt| decoder.decode(&pkt));
        match decoded {
            Ok(stamped) => {
                let text = serde_json::to_string(&stamped).expect("sample serializes");
                writeln!(out, "{text}")?;
                stats.accepted += 1;
            }
            Err(_) => stats.rejected += 1,
        }
    }
    Ok(stats)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <capture> <binary|ascii>", args[0]);
        return ExitCode::FAILURE;
    }

    let mode = match args[2].as_str() {
        "binary" => OutputMode::Binary,
        "ascii" => OutputMode::Ascii,
        other => {
            eprintln!("unknown mode {other:?}, expected binary or ascii");
            return ExitCode::FAILURE;
        }
    };

    let data = match fs::read(&args[1]) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("failed to read {}: {err}", args[1]);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("read {} bytes from {}", data.len(), args[1]);

    let config = OutputConfig::new(mode, 100, true, true, true);
    let mut decoder = Decoder::builder()
        .config(config)
        .sync(SyncInfo::new(DEFAULT_SYNC_RATE, DEFAULT_PULSE_WIDTH_US).into())
        .build();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let zult = match mode {
        OutputMode::Binary => dump_binary(&data, &mut decoder, &mut out),
        OutputMode::Ascii => dump_ascii(&data, &mut decoder, &mut out),
    };

    match zult.and_then(|stats| out.flush().map(|()| stats)) {
        Ok(stats) => {
            eprintln!(
                "{} accepted, {} rejected, {} bytes skipped, {} clock regressions",
                stats.accepted,
                stats.rejected,
                stats.skipped_bytes,
                decoder.clock_regressions()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("write failed: {err}");
            ExitCode::FAILURE
        }
    }
}

//! getrecords command - Consume records from a stream shard
//!
//! Seeks the shard to a starting position, then reads batches until the
//! shard is drained or the record cap is reached. With --watch the command
//! keeps polling for new records instead of stopping when caught up.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;
use gs_core::{AliasManager, GridStore as _, SeekTarget, StreamRecord, parse_remote_path};
use gs_webgate::GatewayClient;
use serde::Serialize;

use crate::exit_code::{ExitCode, exit_code_for};
use crate::output::{Formatter, OutputConfig};

/// Consume records from a stream shard
#[derive(Args, Debug)]
pub struct GetrecordsArgs {
    /// Remote shard path (alias/container/stream/shard-id)
    pub path: String,

    /// Where to start reading: EARLIEST, LATEST, SEQUENCE or TIME
    #[arg(short = 'k', long, default_value = "EARLIEST")]
    pub seek: String,

    /// Sequence number to start from (with --seek SEQUENCE)
    #[arg(short = 'n', long)]
    pub sequence: Option<u64>,

    /// Time to start from, RFC 3339 or epoch seconds (with --seek TIME)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Maximum records to print (0 means no cap)
    #[arg(short, long, default_value = "50")]
    pub max_records: usize,

    /// Keep polling for new records every SECONDS (default 2) instead of
    /// stopping when caught up
    #[arg(short, long, num_args = 0..=1, default_missing_value = "2", value_name = "SECONDS")]
    pub watch: Option<u64>,
}

/// One consumed record (JSON format)
#[derive(Debug, Serialize)]
struct RecordOutput {
    sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arrival_time: Option<jiff::Timestamp>,
    /// Payload, base64 encoded
    data: String,
}

/// One consumed batch (JSON format)
#[derive(Debug, Serialize)]
struct BatchOutput {
    records: Vec<RecordOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records_behind_latest: Option<u64>,
}

/// Execute the getrecords command
pub async fn execute(args: GetrecordsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_remote_path(&args.path) {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&format!("Invalid path: {e}"));
            return ExitCode::UsageError;
        }
    };

    if path.key.is_empty() {
        formatter.error("Shard path must include a stream and shard id (alias/container/stream/shard-id)");
        return ExitCode::UsageError;
    }

    let target = match parse_seek_target(&args.seek, args.sequence, args.time.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let alias_manager = match AliasManager::new() {
        Ok(am) => am,
        Err(e) => {
            formatter.error(&format!("Failed to load aliases: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let alias = match alias_manager.get(&path.alias) {
        Ok(a) => a,
        Err(_) => {
            formatter.error(&format!("Alias '{}' not found", path.alias));
            return ExitCode::NotFound;
        }
    };

    let client = match GatewayClient::new(&alias) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create gateway client: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let mut location = match client.seek_shard(&path, target).await {
        Ok(l) => l,
        Err(e) => {
            formatter.error(&format!("Failed to seek {path}: {e}"));
            return exit_code_for(&e);
        }
    };

    let cap = args.max_records;
    let mut printed = 0usize;

    loop {
        let request_limit = if cap == 0 {
            1000
        } else {
            (cap - printed).min(1000)
        };

        let batch = match client.get_records(&path, &location, request_limit).await {
            Ok(b) => b,
            Err(e) => {
                formatter.error(&format!("Failed to read records from {path}: {e}"));
                return exit_code_for(&e);
            }
        };

        location = batch.next_location.clone();
        printed += batch.records.len();

        if !batch.records.is_empty() {
            if formatter.is_json() {
                formatter.json(&BatchOutput {
                    records: batch.records.iter().map(record_output).collect(),
                    records_behind_latest: batch.records_behind_latest,
                });
            } else {
                for record in &batch.records {
                    print_record(&formatter, record);
                }
            }
        }

        if cap != 0 && printed >= cap {
            break;
        }

        let caught_up = batch.records.is_empty() || batch.records_behind_latest == Some(0);
        if caught_up {
            match args.watch {
                Some(seconds) => {
                    tokio::time::sleep(std::time::Duration::from_secs(seconds.max(1))).await;
                }
                None => break,
            }
        }
    }

    ExitCode::Success
}

fn record_output(record: &StreamRecord) -> RecordOutput {
    RecordOutput {
        sequence: record.sequence,
        partition_key: record.partition_key.clone(),
        arrival_time: record.arrival_time,
        data: BASE64.encode(&record.data),
    }
}

fn print_record(formatter: &Formatter, record: &StreamRecord) {
    let mut header = format!("--- seq={}", record.sequence);
    if let Some(arrival) = record.arrival_time {
        header.push_str(&format!(" arrival={arrival}"));
    }
    if let Some(partition_key) = &record.partition_key {
        header.push_str(&format!(" partition={partition_key}"));
    }
    formatter.println(&header);
    formatter.println(&String::from_utf8_lossy(&record.data));
}

/// Translate the seek flags into a seek target
fn parse_seek_target(
    seek: &str,
    sequence: Option<u64>,
    time: Option<&str>,
) -> Result<SeekTarget, String> {
    match seek.to_ascii_uppercase().as_str() {
        "EARLIEST" => Ok(SeekTarget::Earliest),
        "LATEST" => Ok(SeekTarget::Latest),
        "SEQUENCE" => sequence
            .map(SeekTarget::Sequence)
            .ok_or_else(|| "Seek type SEQUENCE requires --sequence".to_string()),
        "TIME" => {
            let raw = time.ok_or_else(|| "Seek type TIME requires --time".to_string())?;
            parse_time(raw).map(SeekTarget::Time)
        }
        other => Err(format!(
            "Unknown seek type: {other} (expected EARLIEST, LATEST, SEQUENCE or TIME)"
        )),
    }
}

/// Parse a time argument as RFC 3339 or epoch seconds
fn parse_time(raw: &str) -> Result<jiff::Timestamp, String> {
    if let Ok(timestamp) = raw.parse::<jiff::Timestamp>() {
        return Ok(timestamp);
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        return jiff::Timestamp::from_second(epoch)
            .map_err(|e| format!("Epoch seconds out of range: {e}"));
    }
    Err(format!(
        "Cannot parse time '{raw}' (expected RFC 3339 or epoch seconds)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seek_target_simple() {
        assert_eq!(
            parse_seek_target("EARLIEST", None, None),
            Ok(SeekTarget::Earliest)
        );
        assert_eq!(
            parse_seek_target("latest", None, None),
            Ok(SeekTarget::Latest)
        );
    }

    #[test]
    fn test_parse_seek_target_sequence() {
        assert_eq!(
            parse_seek_target("sequence", Some(42), None),
            Ok(SeekTarget::Sequence(42))
        );
        assert!(parse_seek_target("SEQUENCE", None, None).is_err());
    }

    #[test]
    fn test_parse_seek_target_time() {
        let target = parse_seek_target("TIME", None, Some("2024-06-01T00:00:00Z")).unwrap();
        assert!(matches!(target, SeekTarget::Time(_)));
        assert!(parse_seek_target("TIME", None, None).is_err());
    }

    #[test]
    fn test_parse_seek_target_unknown() {
        assert!(parse_seek_target("MIDDLE", None, None).is_err());
    }

    #[test]
    fn test_parse_time_epoch() {
        let timestamp = parse_time("1717200000").unwrap();
        assert_eq!(timestamp.as_second(), 1717200000);
    }

    #[test]
    fn test_parse_time_rfc3339() {
        let timestamp = parse_time("2024-06-01T00:00:00Z").unwrap();
        assert_eq!(timestamp.as_second(), 1717200000);
    }

    #[test]
    fn test_parse_time_garbage() {
        assert!(parse_time("yesterday").is_err());
    }
}

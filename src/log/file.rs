use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::info;

use super::{ClusterCoord, IoDirection, LogRecord};

/// Column headers of the simulator's CSV log
pub const CLUSTER_ID: &str = "cluster_id";
pub const TID: &str = "tid";
pub const PACKET: &str = "packet";
pub const UNIT: &str = "unit";
pub const AREA: &str = "area";
pub const TIMESTAMP: &str = "timeStemp";
pub const IO: &str = "io";

const REQUIRED: [&str; 5] = [CLUSTER_ID, TID, UNIT, AREA, TIMESTAMP];

/// Load every record of a CSV simulator log
pub fn load_csv(path: &Path) -> Result<Vec<LogRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open log file {}", path.display()))?;
    let records = parse_csv(BufReader::new(file)).with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "loaded log file");
    Ok(records)
}

/// Parse CSV log content. Columns are located by header name, so order is free.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<LogRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader.headers().context("Failed to read header")?;
    if header.iter().all(str::is_empty) {
        bail!("Log file is empty");
    }
    let columns: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i))
        .collect();
    for name in REQUIRED {
        if !columns.contains_key(name) {
            bail!("Missing required column '{}'", name);
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let line_no = row.position().map_or(0, |pos| pos.line());
        let get = |name: &str| cell(&columns, &row, name, line_no);

        let cluster: ClusterCoord = get(CLUSTER_ID)?.parse().with_context(|| format!("line {}", line_no))?;
        let tid = parse_int(get(TID)?, TID, line_no)?;
        let timestamp = parse_int(get(TIMESTAMP)?, TIMESTAMP, line_no)?;
        let io = match optional(&columns, &row, IO) {
            Some(text) if !text.is_empty() => Some(text.parse::<IoDirection>().with_context(|| format!("line {}", line_no))?),
            _ => None,
        };

        records.push(LogRecord {
            id: records.len() as u64,
            timestamp,
            tid,
            cluster,
            area: get(AREA)?.to_string(),
            unit: get(UNIT)?.to_string(),
            io,
            packet: optional(&columns, &row, PACKET).unwrap_or_default().to_string(),
        });
    }
    Ok(records)
}

fn cell<'a>(columns: &HashMap<String, usize>, row: &'a StringRecord, name: &str, line_no: u64) -> Result<&'a str> {
    optional(columns, row, name).ok_or_else(|| anyhow!("line {}: missing '{}' value", line_no, name))
}

fn optional<'a>(columns: &HashMap<String, usize>, row: &'a StringRecord, name: &str) -> Option<&'a str> {
    columns.get(name).and_then(|&i| row.get(i))
}

fn parse_int(text: &str, column: &str, line_no: u64) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|_| anyhow!("line {}: '{}' is not a valid {}", line_no, text, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
timeStemp,cluster_id,tid,unit,area,packet,io
10,0:0:0:1:2,7,TCU,Core,\"rd 0x10, len 4\",in
20,0:1:3:0:0,42,BMT,Die,wr 0x20,out
30,0.0.2.7.7,7,CBU,Quad,,
";

    #[test]
    fn test_parse_sample() {
        let records = parse_csv(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, 0);
        assert_eq!(records[0].timestamp, 10);
        assert_eq!(records[0].tid, 7);
        assert_eq!(records[0].cluster, ClusterCoord::new(0, 0, 0, 1, 2));
        assert_eq!(records[0].packet, "rd 0x10, len 4");
        assert_eq!(records[0].io, Some(IoDirection::In));

        assert_eq!(records[1].io, Some(IoDirection::Out));
        assert_eq!(records[2].cluster, ClusterCoord::new(0, 0, 2, 7, 7));
        assert_eq!(records[2].io, None);
        assert_eq!(records[2].packet, "");
    }

    #[test]
    fn test_escaped_quotes_in_cell() {
        let content = "cluster_id,tid,unit,area,timeStemp,packet\n0:0:0:0:0,1,TCU,Core,5,\"say \"\"hi\"\", ok\"\n";
        let records = parse_csv(Cursor::new(content)).unwrap();
        assert_eq!(records[0].packet, "say \"hi\", ok");
    }

    #[test]
    fn test_quoted_cell_spanning_lines() {
        let content = "cluster_id,tid,unit,area,timeStemp,packet\n0:0:0:0:0,1,TCU,Core,5,\"first\nsecond\"\n0:0:0:0:1,abc,TCU,Core,6,\n";
        let err = parse_csv(Cursor::new(content)).unwrap_err();
        // The bad row starts on line 4, after the two-line packet
        assert!(err.to_string().contains("line 4"), "got: {}", err);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_csv(Cursor::new("tid,unit,area,timeStemp\n1,TCU,Core,5\n")).unwrap_err();
        assert!(err.to_string().contains("cluster_id"), "got: {}", err);
    }

    #[test]
    fn test_bad_tid_reports_line() {
        let content = "cluster_id,tid,unit,area,timeStemp\n0:0:0:0:0,abc,TCU,Core,5\n";
        let err = parse_csv(Cursor::new(content)).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {}", err);
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_csv(Cursor::new("")).is_err());
    }

    #[test]
    fn test_load_csv_from_disk() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", SAMPLE).unwrap();
        temp_file.flush().unwrap();

        let records = load_csv(temp_file.path()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv(Path::new("/nonexistent/simlog.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"), "got: {}", err);
    }
}

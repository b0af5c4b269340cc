mod common;

use std::io::Write;

use common::*;
use simlog_filter::filter::{FilterChainApplier, FilterInput, FilterKind};
use simlog_filter::log::{ClusterCoord, InMemoryDataset, IoDirection, load_csv};
use tempfile::NamedTempFile;

const LOG: &str = "\
timeStemp,cluster_id,tid,unit,area,packet,io
100,0:0:0:1:2,7,TCU,Core,rd 0x10,in
110,0:1:2:3:4,42,TCU,Die,wr 0x20,out

120,0:1:2:3:4,42,CBU,Core,\"ack, 4 bytes\",in
130,0:0:3:5:5,13,EQ,Quad,,
";

fn write_log(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_filter_csv() {
    let file = write_log(LOG);
    let records = load_csv(file.path()).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].packet, "ack, 4 bytes");
    assert_eq!(records[2].io, Some(IoDirection::In));
    assert_eq!(records[3].io, None);

    let mut dataset = InMemoryDataset::new(records);
    let mut registry = create_test_registry();
    let request = registry
        .activate(FilterKind::Unit, FilterInput::selection([("Unit", "TCU")]))
        .unwrap();
    let view = FilterChainApplier::apply(&mut dataset, &request);

    assert_eq!(view.visible, 2);
    assert_eq!(view.total, 4);
    assert_eq!(dataset.component_logs(&ClusterCoord::new(0, 1, 2, 3, 4)).len(), 1);
}

#[test]
fn test_columns_may_come_in_any_order() {
    let file = write_log("area,unit,tid,cluster_id,timeStemp\nCore,BMT,3,0.1.0.2.2,5\n");
    let records = load_csv(file.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cluster, ClusterCoord::new(0, 1, 0, 2, 2));
    assert_eq!(records[0].unit, "BMT");
    assert_eq!(records[0].io, None);
}

#[test]
fn test_bad_cluster_id_names_line() {
    let file = write_log("cluster_id,tid,unit,area,timeStemp\n0:0:0:0:0,1,TCU,Core,5\n0:0,1,TCU,Core,6\n");
    let err = load_csv(file.path()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("line 3"), "got: {}", message);
}

#[test]
fn test_bad_io_is_error() {
    let file = write_log("cluster_id,tid,unit,area,timeStemp,io\n0:0:0:0:0,1,TCU,Core,5,sideways\n");
    assert!(load_csv(file.path()).is_err());
}

#[test]
fn test_header_only_is_empty_log() {
    let file = write_log("cluster_id,tid,unit,area,timeStemp\n");
    let records = load_csv(file.path()).unwrap();
    assert!(records.is_empty());

    let dataset = InMemoryDataset::new(records);
    assert_eq!(dataset.view().visible, 0);
    assert!(dataset.selectable_thread_ids().is_empty());
}

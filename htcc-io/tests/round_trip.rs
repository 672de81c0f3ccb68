use htcc_algorithms::EventReconstructor;
use htcc_io::{
    parameters_from_json, ClusterFileWriter, Error, EventFileReader, OutputFormat,
    BINARY_RECORD_SIZE, CSV_HEADER,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const EVENTS: &str = r#"{"event": 10, "hits": [{"ring": 1, "sector": 1, "half": 2, "nphe": 5, "time": 12.0}, {"ring": 2, "sector": 1, "half": 2, "nphe": 3, "time": 12.5}, {"ring": 4, "sector": 6, "half": 1, "nphe": 1, "time": 30.0}]}
{"event": 11}
{"event": 12, "hits": [{"ring": 1,
{"event": 13, "hits": [{"ring": 3, "sector": 4, "half": 1, "nphe": 4, "time": 20.0}]}
"#;

fn event_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EVENTS.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Reads, clusters and writes every event; malformed lines produce no output.
fn run(format: OutputFormat, output: &std::path::Path) -> (usize, usize) {
    let input = event_file();
    let reader = EventFileReader::open(input.path()).unwrap();
    let mut reconstructor = EventReconstructor::new(parameters_from_json("{}").unwrap());
    let mut writer = ClusterFileWriter::create(output).unwrap();

    let mut clusters = 0;
    let mut bad_lines = 0;
    let mut wrote_header = false;
    for event in reader.events() {
        let event = match event {
            Ok(event) => event,
            Err(Error::InvalidFormat { line, .. }) => {
                assert_eq!(line, 3);
                bad_lines += 1;
                continue;
            }
            Err(e) => panic!("unexpected error: {e}"),
        };
        let records = reconstructor.process(&event.hits).unwrap();
        writer
            .write_clusters(format, event.event, &records, !wrote_header)
            .unwrap();
        wrote_header = true;
        clusters += records.len();
    }
    writer.flush().unwrap();
    (clusters, bad_lines)
}

#[test]
fn test_events_to_csv() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clusters.csv");

    let (clusters, bad_lines) = run(OutputFormat::Csv, &output);
    assert_eq!((clusters, bad_lines), (2, 1));

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    // two-hit cluster spanning rings 0 and 1 in phi bin 0
    assert!(lines[1].starts_with("10,2,2,1,0,1,0,0,8,"));
    assert!(lines[2].starts_with("13,1,1,1,2,2,5,5,4,"));
}

#[test]
fn test_events_to_binary() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("clusters.bin");

    let (clusters, _) = run(OutputFormat::Binary, &output);
    let data = std::fs::read(&output).unwrap();

    assert_eq!(data.len(), clusters * BINARY_RECORD_SIZE);
    assert_eq!(&data[0..8], &10u64.to_le_bytes());
    assert_eq!(&data[BINARY_RECORD_SIZE..BINARY_RECORD_SIZE + 8], &13u64.to_le_bytes());
}

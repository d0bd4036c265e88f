mod common;

use clearlane_csv::{
    CancelToken, ParseConfig, ParseError, ProgressEvent, Value, parse_text, parse_text_with,
};

use crate::common::hourly_csv;

fn violations(output: &clearlane_csv::ParseOutput) -> Vec<i64> {
    output
        .rows
        .iter()
        .map(|row| match row.get("violations") {
            Some(Value::Integer(n)) => *n,
            other => panic!("unexpected violations value {other:?}"),
        })
        .collect()
}

#[test]
fn sampling_takes_every_second_line_deterministically() {
    let text = hourly_csv(100);
    let config = ParseConfig {
        sample_rate: 0.5,
        ..ParseConfig::default()
    };
    let first = parse_text(&text, &config).expect("parse");
    let second = parse_text(&text, &config).expect("parse");

    assert_eq!(first.row_count(), 50);
    let expected = (1..=100).step_by(2).collect::<Vec<i64>>();
    assert_eq!(violations(&first), expected);
    assert_eq!(first, second);
}

#[test]
fn max_rows_keeps_the_first_rows_in_file_order() {
    let text = hourly_csv(1000);
    let config = ParseConfig {
        max_rows: Some(5),
        ..ParseConfig::default()
    };
    let output = parse_text(&text, &config).expect("parse");
    assert_eq!(violations(&output), vec![1, 2, 3, 4, 5]);
}

#[test]
fn malformed_interior_line_is_skipped() {
    let text = "stop_name,violations\n\
                Main St,4\n\
                \"Broken Ave,7\n\
                \"Fordham Rd, Bronx\",12\n\
                Grand Concourse,9";
    let output = parse_text(text, &ParseConfig::default()).expect("parse");
    let stops = output
        .rows
        .iter()
        .map(|row| row.get("stop_name").and_then(Value::as_text).unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(stops, vec!["Main St", "Fordham Rd, Bronx", "Grand Concourse"]);
}

#[test]
fn malformed_lines_do_not_count_toward_max_rows() {
    let text = "a\n\"bad\n1\n2";
    let config = ParseConfig {
        max_rows: Some(2),
        ..ParseConfig::default()
    };
    let output = parse_text(text, &config).expect("parse");
    assert_eq!(output.row_count(), 2);
}

#[test]
fn extreme_sampling_yields_an_empty_result() {
    let text = hourly_csv(10);
    let config = ParseConfig {
        sample_rate: 0.05,
        ..ParseConfig::default()
    };
    let output = parse_text(&text, &config).expect("parse");
    assert!(output.rows.is_empty());
    assert!(output.compression_summary.is_none());

    let zero = ParseConfig {
        sample_rate: 0.0,
        ..ParseConfig::default()
    };
    assert!(parse_text(&text, &zero).expect("parse").rows.is_empty());
}

#[test]
fn type_detection_can_be_disabled() {
    let config = ParseConfig {
        enable_type_detection: false,
        ..ParseConfig::default()
    };
    let output = parse_text("hour,flag,note\n7,true,", &config).expect("parse");
    let row = &output.rows[0];
    assert_eq!(row.get("hour"), Some(&Value::from("7")));
    assert_eq!(row.get("flag"), Some(&Value::from("true")));
    assert_eq!(row.get("note"), Some(&Value::from("")));
}

#[test]
fn empty_fields_infer_to_null() {
    let output = parse_text("a,b,c\n1,,3", &ParseConfig::default()).expect("parse");
    assert_eq!(output.rows[0].get("b"), Some(&Value::Null));
}

#[test]
fn progress_fires_every_thousand_rows() {
    let text = hourly_csv(2500);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let output = parse_text_with(&text, &ParseConfig::default(), &CancelToken::new(), |event| {
        events.push(event)
    })
    .expect("parse");

    assert_eq!(output.row_count(), 2500);
    assert_eq!(
        events.iter().map(|e| e.processed).collect::<Vec<_>>(),
        vec![1000, 2000]
    );
    assert!(events.iter().all(|e| e.total == 2500));
    assert_eq!(events[0].percentage, 40.0);
}

#[test]
fn cancellation_stops_the_parse() {
    let text = hourly_csv(5000);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let err = parse_text_with(&text, &ParseConfig::default(), &cancel, |_| token.cancel())
        .unwrap_err();
    assert!(matches!(err, ParseError::Cancelled { processed: 1000 }));
}

#[test]
fn compression_threshold_is_inclusive() {
    // 20 rows: threshold is floor(20 * 0.1) = 2
    let mut text = String::from("route,status\n");
    for i in 0..20 {
        let route = match i {
            0 | 1 => "Q44".to_string(),
            2 => "Bx41".to_string(),
            other => format!("R{other}"),
        };
        text.push_str(&format!("{route},active\n"));
    }
    let config = ParseConfig {
        enable_compression: true,
        ..ParseConfig::default()
    };
    let output = parse_text(&text, &config).expect("parse");
    let summary = output.compression_summary.as_ref().expect("summary");

    let routes = summary.for_column("route").expect("route entries");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].value, "Q44");
    assert_eq!(routes[0].count, 2);

    let status = summary.for_column("status").expect("status entries");
    assert_eq!(status[0].count, 20);
    assert_eq!(summary.compression_ratio, 1.0);
    assert_eq!(output.row_count(), 20);
}

#[test]
fn compression_does_not_alter_rows() {
    let text = hourly_csv(30);
    let plain = parse_text(&text, &ParseConfig::default()).expect("parse");
    let compressed = parse_text(
        &text,
        &ParseConfig {
            enable_compression: true,
            ..ParseConfig::default()
        },
    )
    .expect("parse");
    assert_eq!(plain.rows, compressed.rows);
}

#[test]
fn invalid_config_is_catastrophic() {
    let config = ParseConfig {
        sample_rate: 2.0,
        ..ParseConfig::default()
    };
    let err = parse_text("a\n1", &config).unwrap_err();
    assert!(matches!(err, ParseError::InvalidConfig { .. }));
}

#[test]
fn semicolon_dialect_with_single_quotes() {
    let config = ParseConfig {
        delimiter: ';',
        quote: '\'',
        escape: '\'',
        ..ParseConfig::default()
    };
    let output = parse_text("name;share\n'Hunter''s Point; LIC';12.5%", &config).expect("parse");
    let row = &output.rows[0];
    assert_eq!(row.get("name"), Some(&Value::from("Hunter's Point; LIC")));
    assert_eq!(row.get("share"), Some(&Value::Float(0.125)));
}

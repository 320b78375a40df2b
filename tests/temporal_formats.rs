use std::io::Cursor;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use ednreader::datatype::{FieldType, Value};
use ednreader::reader::EdnRecordReader;
use ednreader::record::{Field, Schema};
use ednreader::settings::FormatSettings;
use ednreader::EdnReaderError;

fn setup(input: &str, formats: FormatSettings) -> EdnRecordReader<Cursor<Vec<u8>>> {
    let schema = Schema::new(vec![
        Field::new("born", FieldType::Date),
        Field::new("alarm", FieldType::Time),
        Field::new("seen", FieldType::Timestamp),
    ])
    .unwrap();
    EdnRecordReader::open(Cursor::new(input.as_bytes().to_vec()), Arc::new(schema), &formats)
}

#[test]
fn configured_date_format_in_both_modes() {
    let formats = FormatSettings::new(Some("%d.%m.%Y"), None, None);
    let expected = Value::Date(NaiveDate::from_ymd_opt(1994, 3, 1).unwrap());

    let mut reader = setup("{:born \"01.03.1994\"}", formats.clone());
    let strict = reader.next_record(true, true).unwrap().unwrap();
    assert_eq!(strict.get("born"), Some(&expected));

    let mut reader = setup("{:born \"01.03.1994\"}", formats);
    let lenient = reader.next_record(false, true).unwrap().unwrap();
    assert_eq!(lenient.get("born"), Some(&expected));
}

#[test]
fn default_resolution_without_formats() {
    let mut reader = setup(
        "{:born \"2024-01-15\" :alarm \"06:30:00\" :seen \"2024-01-15 06:30:00\"}\n{:seen 86400000}",
        FormatSettings::default(),
    );
    let first = reader.next_record(true, true).unwrap().unwrap();
    assert_eq!(first.get("born"), Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())));
    assert_eq!(first.get("alarm"), Some(&Value::Time(NaiveTime::from_hms_opt(6, 30, 0).unwrap())));
    assert_eq!(
        first.get("seen"),
        Some(&Value::Timestamp(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(6, 30, 0).unwrap()
        ))
    );
    // integer text is epoch milliseconds
    let second = reader.next_record(true, true).unwrap().unwrap();
    assert_eq!(
        second.get("seen"),
        Some(&Value::Timestamp(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap()))
    );
}

#[test]
fn mismatched_temporal_text() {
    let formats = FormatSettings::new(Some("%d.%m.%Y"), None, None);
    let mut reader = setup("{:born \"1994-03-01\"}", formats.clone());
    let err = reader.next_record(true, true).expect_err("pattern does not match");
    assert!(matches!(err.root_cause(), EdnReaderError::Conversion { field, .. } if field == "born"));

    let mut reader = setup("{:born \"1994-03-01\"}", formats);
    let record = reader.next_record(false, true).unwrap().unwrap();
    assert_eq!(record.get("born"), Some(&Value::String("1994-03-01".into())));
}

#[test]
fn formats_are_only_built_when_needed() {
    let formats = FormatSettings::new(Some("%d.%m.%Y"), Some("%H.%M"), None);
    let mut reader = setup("{:born \"01.03.1994\"}", formats);
    reader.next_record(true, true).unwrap().unwrap();
    let converter = reader.converter();
    assert!(converter.format(ednreader::format::TemporalKind::Date).is_compiled());
    assert!(!converter.format(ednreader::format::TemporalKind::Time).is_compiled());
}

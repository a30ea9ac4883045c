use crate::error::{DecodeError, DecodeErrorReason};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field name to untyped text, as handed to the shredder.
pub type RawFieldMap = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Base64 text as carried by a Kinesis record.
    Encoded(String),
    /// A bare application event that never went through the transport encoding.
    Decoded(Map<String, Value>),
    /// A Kinesis record without a `data` string.
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    Data(Payload),
    /// S3, DynamoDB and any other record shape, left untouched.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub index: usize,
    pub id: String,
    pub kind: RecordKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Fields(RawFieldMap),
    PassThrough(Value),
}

/// Splits a Lambda event into its records.
///
/// A `Records` array yields one record per element. Any other object, including
/// one whose `Records` is not an array, is taken as a single application event
/// that is already decoded. Anything else, a bare array included, is malformed.
pub fn parse_batch(input: &Value) -> Result<Vec<BatchRecord>, DecodeError> {
    match input {
        Value::Object(object) => match object.get("Records") {
            Some(Value::Array(records)) => Ok(parse_records(records)),
            _ => {
                tracing::debug!("input has no Records array, treating it as a single event");
                Ok(vec![BatchRecord {
                    index: 0,
                    id: "0".to_string(),
                    kind: RecordKind::Data(Payload::Decoded(object.clone())),
                }])
            }
        },
        _ => Err(DecodeError::batch(DecodeErrorReason::MalformedBatch)),
    }
}

fn parse_records(records: &[Value]) -> Vec<BatchRecord> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let kind = match record.get("kinesis") {
                Some(kinesis) => match kinesis.get("data").and_then(Value::as_str) {
                    Some(data) => RecordKind::Data(Payload::Encoded(data.to_string())),
                    None => RecordKind::Data(Payload::Missing),
                },
                None => RecordKind::Other(record.clone()),
            };

            BatchRecord {
                index,
                id: record_id(record, index),
                kind,
            }
        })
        .collect()
}

/// The Kinesis sequence number is what a partial batch response must echo back.
fn record_id(record: &Value, index: usize) -> String {
    record
        .pointer("/kinesis/sequenceNumber")
        .or_else(|| record.get("eventID"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| index.to_string())
}

/// Base64 is the only transport encoding.
pub fn decode(encoded: &str) -> Result<Vec<u8>, DecodeErrorReason> {
    Ok(STANDARD.decode(encoded)?)
}

pub fn decode_record(record: &BatchRecord) -> Result<DecodedRecord, DecodeError> {
    let at = |reason| DecodeError::at(record.index, reason);

    match &record.kind {
        RecordKind::Other(value) => Ok(DecodedRecord::PassThrough(value.clone())),
        RecordKind::Data(Payload::Missing) => Err(at(DecodeErrorReason::MissingData)),
        RecordKind::Data(Payload::Decoded(object)) => {
            Ok(DecodedRecord::Fields(to_field_map(object)))
        }
        RecordKind::Data(Payload::Encoded(encoded)) => {
            let bytes = decode(encoded).map_err(at)?;
            let text = String::from_utf8(bytes).map_err(|e| at(e.into()))?;
            match serde_json::from_str::<Value>(&text).map_err(|e| at(e.into()))? {
                Value::Object(object) => Ok(DecodedRecord::Fields(to_field_map(&object))),
                _ => Err(at(DecodeErrorReason::NotAnObject)),
            }
        }
    }
}

/// One result per record, in order. A failing record never stops the rest.
pub fn decode_batch(records: &[BatchRecord]) -> Vec<Result<DecodedRecord, DecodeError>> {
    records.iter().map(decode_record).collect()
}

fn to_field_map(object: &Map<String, Value>) -> RawFieldMap {
    object
        .iter()
        .filter_map(|(name, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(text) => text.clone(),
                Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
                    value.to_string()
                }
            };
            Some((name.clone(), text))
        })
        .collect()
}

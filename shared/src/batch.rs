use crate::decoder::{decode_record, parse_batch, BatchRecord, DecodedRecord, Payload, RecordKind};
use crate::error::{CombinedError, DecodeError};
use crate::schema::EnrichedEvent;
use crate::shredder::shred;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Shredded {
    Event(EnrichedEvent),
    /// A non-data record, handed back as received.
    PassThrough(Value),
}

/// The result for one position of the incoming batch.
#[derive(Debug)]
pub struct RecordOutcome {
    pub index: usize,
    pub id: String,
    /// Set when the input was a single application event rather than a transport batch.
    pub bare_event: bool,
    pub result: Result<Shredded, CombinedError>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub events: usize,
    pub passed_through: usize,
    pub decode_failures: usize,
    pub field_failures: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[RecordOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match &outcome.result {
                    Ok(Shredded::Event(_)) => summary.events += 1,
                    Ok(Shredded::PassThrough(_)) => summary.passed_through += 1,
                    Err(CombinedError::Decode(_)) => summary.decode_failures += 1,
                    Err(CombinedError::Fields(_)) => summary.field_failures += 1,
                }
                summary
            })
    }

    pub fn failures(&self) -> usize {
        self.decode_failures + self.field_failures
    }
}

#[tracing::instrument(skip(record), fields(record.id = %record.id, record.index = record.index))]
fn shred_record(record: &BatchRecord) -> RecordOutcome {
    let result = match decode_record(record) {
        Ok(DecodedRecord::Fields(fields)) => shred(&fields)
            .map(Shredded::Event)
            .map_err(CombinedError::Fields),
        Ok(DecodedRecord::PassThrough(value)) => Ok(Shredded::PassThrough(value)),
        Err(e) => Err(CombinedError::Decode(e)),
    };

    if let Err(e) = &result {
        tracing::warn!("Rejected record: {}", e);
    }

    RecordOutcome {
        index: record.index,
        id: record.id.clone(),
        bare_event: matches!(record.kind, RecordKind::Data(Payload::Decoded(_))),
        result,
    }
}

/// Decodes and shreds every record independently, preserving order.
pub fn shred_batch(records: &[BatchRecord]) -> Vec<RecordOutcome> {
    records.iter().map(shred_record).collect()
}

/// Parses a raw Lambda event and shreds it. Only input that is neither a record
/// batch nor an event object fails as a whole.
pub fn shred_input(input: &Value) -> Result<Vec<RecordOutcome>, DecodeError> {
    let records = parse_batch(input)?;
    let outcomes = shred_batch(&records);
    tracing::info!(summary = ?BatchSummary::of(&outcomes), "Shredded batch");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::{shred_input, BatchSummary, Shredded};
    use crate::error::{CombinedError, DecodeErrorReason};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::{json, Value};

    fn kinesis_record(sequence_number: &str, data: String) -> Value {
        json!({
            "kinesis": {
                "data": data,
                "partitionKey": "test-partition",
                "sequenceNumber": sequence_number
            },
            "eventSource": "aws:kinesis",
            "eventName": "aws:kinesis:record"
        })
    }

    fn encoded(payload: Value) -> String {
        STANDARD.encode(payload.to_string())
    }

    #[test]
    fn when_batch_is_mixed_should_keep_each_outcome_independent() {
        let input = json!({
            "Records": [
                kinesis_record("100", encoded(json!({"app_id": "42", "br_cookies": "1"}))),
                kinesis_record("101", "***".to_string()),
                kinesis_record("102", encoded(json!({"app_id": "42", "geo_latitude": "x", "doc_width": "y"}))),
                {"eventID": "ddb-1", "dynamodb": {}},
                kinesis_record("103", encoded(json!({"geo_latitude": "51.5"}))),
            ]
        });

        let outcomes = shred_input(&input).unwrap();

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| !o.bare_event));
        let ids: Vec<&str> = outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["100", "101", "102", "ddb-1", "103"]);

        match &outcomes[0].result {
            Ok(Shredded::Event(event)) => assert_eq!(event.br_cookies, Some(true)),
            other => panic!("unexpected outcome {:?}", other),
        }
        match &outcomes[1].result {
            Err(CombinedError::Decode(e)) => {
                assert_eq!(e.index, Some(1));
                assert!(matches!(e.reason, DecodeErrorReason::InvalidBase64(_)));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        match &outcomes[2].result {
            Err(CombinedError::Fields(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(
            &outcomes[3].result,
            Ok(Shredded::PassThrough(_))
        ));
        match &outcomes[4].result {
            Ok(Shredded::Event(event)) => assert_eq!(event.geo_latitude, Some(51.5)),
            other => panic!("unexpected outcome {:?}", other),
        }

        assert_eq!(
            BatchSummary::of(&outcomes),
            BatchSummary {
                events: 2,
                passed_through: 1,
                decode_failures: 1,
                field_failures: 1,
            }
        );
    }

    #[test]
    fn when_input_is_bare_event_should_shred_it_without_decoding() {
        let input = json!({"app_id": "1", "domain_sessionidx": 2, "dvce_ismobile": false});

        let outcomes = shred_input(&input).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].bare_event);
        match &outcomes[0].result {
            Ok(Shredded::Event(event)) => {
                assert_eq!(event.app_id.as_deref(), Some("1"));
                assert_eq!(event.domain_sessionidx, Some(2.0));
                assert_eq!(event.dvce_ismobile, Some(false));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn when_input_is_malformed_should_fail_once() {
        let error = shred_input(&json!("just a string")).unwrap_err();

        assert_eq!(error.index, None);
    }

    #[test]
    fn when_input_is_array_of_events_should_fail_instead_of_passing_through() {
        let error = shred_input(&json!([{"app_id": "1"}, {"app_id": "2"}])).unwrap_err();

        assert_eq!(error.index, None);
        assert!(matches!(error.reason, DecodeErrorReason::MalformedBatch));
    }

    #[test]
    fn when_batch_is_empty_should_yield_nothing() {
        let outcomes = shred_input(&json!({"Records": []})).unwrap();

        assert!(outcomes.is_empty());
        assert_eq!(BatchSummary::of(&outcomes).failures(), 0);
    }
}

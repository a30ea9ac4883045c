use std::fmt::Display;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeErrorReason {
    #[error("input is neither a record batch nor an event object")]
    MalformedBatch,
    #[error("kinesis record carries no data")]
    MissingData,
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// A record (or, with no index, the whole input) that could not be decoded.
#[derive(Debug, Error)]
pub struct DecodeError {
    pub index: Option<usize>,
    #[source]
    pub reason: DecodeErrorReason,
}

impl DecodeError {
    pub fn at(index: usize, reason: DecodeErrorReason) -> Self {
        Self {
            index: Some(index),
            reason,
        }
    }

    pub fn batch(reason: DecodeErrorReason) -> Self {
        Self {
            index: None,
            reason,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "record {} could not be decoded: {}", index, self.reason),
            None => write!(f, "batch could not be decoded: {}", self.reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldErrorReason {
    #[error("not numeric")]
    NotNumeric,
    #[error("not boolean")]
    NotBoolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field} has value {value:?}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
    pub reason: FieldErrorReason,
}

/// Why a single batch position produced no event.
#[derive(Debug, Error)]
pub enum CombinedError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{} invalid field(s): {}", .0.len(), join_field_errors(.0))]
    Fields(Vec<FieldError>),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::{CombinedError, DecodeError, DecodeErrorReason, FieldError, FieldErrorReason};

    #[test]
    fn when_decode_error_has_index_should_name_record() {
        let error = DecodeError::at(3, DecodeErrorReason::MissingData);

        assert_eq!(
            error.to_string(),
            "record 3 could not be decoded: kinesis record carries no data"
        );
    }

    #[test]
    fn when_decode_error_is_batch_wide_should_say_so() {
        let error = DecodeError::batch(DecodeErrorReason::MalformedBatch);

        assert_eq!(
            error.to_string(),
            "batch could not be decoded: input is neither a record batch nor an event object"
        );
    }

    #[test]
    fn when_fields_fail_should_list_each() {
        let error = CombinedError::Fields(vec![
            FieldError {
                field: "geo_latitude",
                value: "north".to_string(),
                reason: FieldErrorReason::NotNumeric,
            },
            FieldError {
                field: "br_cookies",
                value: "maybe".to_string(),
                reason: FieldErrorReason::NotBoolean,
            },
        ]);

        assert_eq!(
            error.to_string(),
            "2 invalid field(s): field geo_latitude has value \"north\": not numeric; \
             field br_cookies has value \"maybe\": not boolean"
        );
    }
}

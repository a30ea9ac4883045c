use crate::decoder::RawFieldMap;
use crate::error::{FieldError, FieldErrorReason};
use crate::schema::{field_spec, EnrichedEvent, FieldKind, FieldValue, FIELDS};
use std::collections::HashMap;

/// Materializes a raw field map into an [`EnrichedEvent`].
///
/// Every malformed field is reported, in schema order. No event is produced
/// unless all present fields coerce to their declared kind.
pub fn shred(fields: &RawFieldMap) -> Result<EnrichedEvent, Vec<FieldError>> {
    let mut values = HashMap::with_capacity(fields.len());
    let mut errors = Vec::new();

    for spec in FIELDS {
        let Some(raw) = fields.get(spec.name) else {
            continue;
        };

        match coerce(spec.kind, raw) {
            Ok(Some(value)) => {
                values.insert(spec.name, value);
            }
            Ok(None) => {}
            Err(reason) => errors.push(FieldError {
                field: spec.name,
                value: raw.clone(),
                reason,
            }),
        }
    }

    for name in fields.keys().filter(|name| field_spec(name).is_none()) {
        tracing::debug!(field = %name, "ignoring field outside the enriched event schema");
    }

    if errors.is_empty() {
        Ok(EnrichedEvent::from_values(values))
    } else {
        Err(errors)
    }
}

/// `Ok(None)` means the field stays unset.
fn coerce(kind: FieldKind, raw: &str) -> Result<Option<FieldValue>, FieldErrorReason> {
    match kind {
        FieldKind::String | FieldKind::Opaque => Ok(Some(FieldValue::Text(raw.to_string()))),
        FieldKind::Number if raw.is_empty() => Ok(None),
        FieldKind::Number => parse_number(raw).map(|n| Some(FieldValue::Number(n))),
        FieldKind::Boolean if raw.is_empty() => Ok(None),
        FieldKind::Boolean => parse_boolean(raw).map(|b| Some(FieldValue::Boolean(b))),
    }
}

fn parse_number(raw: &str) -> Result<f64, FieldErrorReason> {
    match raw.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(FieldErrorReason::NotNumeric),
    }
}

fn parse_boolean(raw: &str) -> Result<bool, FieldErrorReason> {
    match raw {
        "1" => Ok(true),
        "0" => Ok(false),
        _ if raw.eq_ignore_ascii_case("true") => Ok(true),
        _ if raw.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(FieldErrorReason::NotBoolean),
    }
}

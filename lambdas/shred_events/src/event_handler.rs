use crate::config::FailureMode;
use aws_lambda_events::streams::{KinesisBatchItemFailure, KinesisEventResponse};
use lambda_runtime::{tracing, Error, LambdaEvent};
use opentelemetry::{global, metrics::Counter, KeyValue};
use serde_json::Value;
use shredder_shared::{
    batch::{shred_input, RecordOutcome, Shredded},
    core::EventSink,
    error::CombinedError,
};

pub(crate) struct HandlerDeps<S: EventSink> {
    pub sink: S,
    pub failure_mode: FailureMode,
}

struct Counters {
    shredded: Counter<u64>,
    rejected: Counter<u64>,
}

/// Takes the raw Lambda event rather than a `KinesisEvent` so that a bare
/// application event, or records from another source, still reach the shredder.
#[tracing::instrument(skip(deps, event))]
pub(crate) async fn function_handler<S: EventSink>(
    deps: &HandlerDeps<S>,
    event: LambdaEvent<Value>,
) -> Result<KinesisEventResponse, Error> {
    let meter = global::meter("shred_events");
    let counters = Counters {
        shredded: meter.u64_counter("events_shredded").build(),
        rejected: meter.u64_counter("records_rejected").build(),
    };

    let outcomes = match shred_input(&event.payload) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            tracing::error!("Failed to decode batch: {}", e);
            return Err(Error::from(e));
        }
    };

    // Sink writes run concurrently; join_all keeps them in batch order
    let tasks: Vec<_> = outcomes
        .iter()
        .map(|outcome| process_outcome(deps, &counters, outcome))
        .collect();
    let results = futures::future::join_all(tasks).await;

    let mut response = KinesisEventResponse {
        batch_item_failures: Vec::new(),
    };
    for (outcome, failed_id) in outcomes.iter().zip(results) {
        let Some(failed_id) = failed_id else {
            continue;
        };
        if outcome.bare_event {
            // Not a Kinesis invocation, there is no batch item to hand back
            return Err(Error::from(format!(
                "Failed to process application event: {}",
                describe_failure(outcome)
            )));
        }
        let failure = KinesisBatchItemFailure {
            item_identifier: Some(failed_id),
        };
        response.batch_item_failures.push(failure);
    }

    tracing::info!(
        "Processed {} records, {} reported as failed",
        outcomes.len(),
        response.batch_item_failures.len()
    );
    Ok(response)
}

fn describe_failure(outcome: &RecordOutcome) -> String {
    match &outcome.result {
        Err(e) => e.to_string(),
        Ok(_) => "event could not be written to the sink".to_string(),
    }
}

/// Returns the record identifier when the record has to be reported back as failed.
#[tracing::instrument("process enriched_event", skip(deps, counters, outcome), fields(
    messaging.message.id = %outcome.id,
    messaging.operation.name = "process",
    messaging.destination = "aws_kinesis",
    messaging.client.id = "shred_events",
))]
async fn process_outcome<S: EventSink>(
    deps: &HandlerDeps<S>,
    counters: &Counters,
    outcome: &RecordOutcome,
) -> Option<String> {
    match &outcome.result {
        Ok(Shredded::Event(event)) => match deps.sink.write(event).await {
            Ok(_) => {
                counters.shredded.add(1, &[]);
                None
            }
            Err(e) => {
                // Sink failures are transient, always hand the record back for a retry
                tracing::error!("Failed to write event {}: {}", outcome.id, e);
                Some(outcome.id.clone())
            }
        },
        Ok(Shredded::PassThrough(_)) => {
            tracing::debug!("Passing through non-data record {}", outcome.id);
            None
        }
        Err(e) => {
            let reason = match e {
                CombinedError::Decode(_) => "decode",
                CombinedError::Fields(_) => "fields",
            };
            counters.rejected.add(1, &[KeyValue::new("reason", reason)]);

            match deps.failure_mode {
                FailureMode::Skip => {
                    tracing::warn!("Skipping record {} due to processing error: {}", outcome.id, e);
                    None
                }
                FailureMode::Report => {
                    tracing::error!("Failed to process record {}: {}", outcome.id, e);
                    Some(outcome.id.clone())
                }
            }
        }
    }
}

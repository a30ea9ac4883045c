use crate::config::Config;
use crate::event_handler::HandlerDeps;
use event_handler::function_handler;
use lambda_runtime::{run, service_fn, tracing, Error};
use shredder_shared::adapters::LogEventSink;

mod config;
mod event_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let config = Config::load()?;
    tracing::info!(failure_mode = ?config.failure_mode, "Configuration loaded");

    let handler_deps = HandlerDeps {
        sink: LogEventSink::new(config.sink_target),
        failure_mode: config.failure_mode,
    };

    run(service_fn(|event| function_handler(&handler_deps, event))).await
}

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// What to do with records that can never succeed (undecodable or with invalid fields).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FailureMode {
    /// Log and drop them, retrying cannot fix a malformed record.
    #[default]
    Skip,
    /// Report them as batch item failures so the stream retries them.
    Report,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Config {
    pub failure_mode: FailureMode,
    pub sink_target: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::default(),
            sink_target: "enriched_event".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            // .merge overrides the defaults with anything set in the environment
            .merge(Env::prefixed("APP_"))
    }
}

mod event_log;
mod experiment;
mod summary;
mod trial;

pub use event_log::{EventLog, EventLogError};
pub use experiment::{
    ExperimentConfig, ExperimentError, ExperimentReport, StrategyChoice, run_experiment,
};
pub use summary::Summary;
pub use trial::{Policy, TrialError, TrialEvent, TrialOutcome, run_trial};

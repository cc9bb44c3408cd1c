use std::process::ExitCode;

use immunotree_cli::{EventLog, ExperimentConfig, ExperimentError, TrialEvent, run_experiment};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ExperimentError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ExperimentConfig::from_yaml_path(path)?,
        None => ExperimentConfig::from_default_yaml()?,
    };

    let mut log = match &config.event_log {
        Some(path) => Some(EventLog::open_append(path)?),
        None => None,
    };
    let mut log_error = None;

    let report = run_experiment(&config, |event| {
        if let TrialEvent::TrialFinished { trial, outcome, .. } = event {
            println!(
                "trial {:>3}: value {:>4} (infected {}, resistant {}, rounds {}, simulations {})",
                trial + 1,
                outcome.value,
                outcome.infected_count,
                outcome.resistant_count,
                outcome.rounds,
                outcome.simulations
            );
        }
        if let Some(log) = log.as_mut() {
            if let Err(err) = log.write_event(event) {
                if log_error.is_none() {
                    log_error = Some(err);
                }
            }
        }
    })?;

    if let Some(err) = log_error {
        return Err(err.into());
    }
    if let Some(log) = log.as_mut() {
        log.flush()?;
    }

    println!(
        "{}: {} trials, mean value {:.3}, std dev {:.3}",
        report.policy, report.summary.trials, report.summary.mean, report.summary.std_dev
    );
    Ok(())
}

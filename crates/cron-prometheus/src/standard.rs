use cron_model::{ExitCode, RunRecord, RunStatus};

use crate::MetricSample;

/// The standard sample set describing one run.
///
/// Besides the scalar values this emits two one-hot families: `cron_status`
/// with one sample per [`RunStatus`] and `cron_exit` with one sample per named
/// [`ExitCode`]. Exactly the sample matching the run is `1` (none of `cron_exit`
/// when the exit code has no name).
pub fn run_samples(record: &RunRecord) -> Vec<MetricSample> {
    let status = record.status();
    let exit_code = record.exit_code();
    let duration_ms = i64::try_from(record.duration().as_millis()).unwrap_or(i64::MAX);
    let timeout_s = i64::try_from(record.timeout().as_secs()).unwrap_or(i64::MAX);

    let mut samples = vec![
        MetricSample::gauge(
            "cron_start_time_seconds",
            "Start time of cronjob last run (epoch)",
            record.start_unix(),
        ),
        MetricSample::gauge(
            "cron_end_time_seconds",
            "End time of cronjob last run (epoch)",
            record.end_unix(),
        ),
        MetricSample::gauge(
            "cron_status_code",
            "Status code of cronjob last run",
            status.code().into(),
        ),
        MetricSample::gauge(
            "cron_exit_code",
            "Exit code of cronjob command last run",
            exit_code.value().into(),
        ),
        MetricSample::gauge(
            "cron_duration_milliseconds",
            "Duration of cronjob last run (milliseconds)",
            duration_ms,
        ),
        MetricSample::gauge("cron_timeout_seconds", "Timeout of cronjob", timeout_s),
        MetricSample::gauge("cron_dryrun", "Dryrun mode", record.dry_run().into()),
    ];

    samples.extend(RunStatus::ALL.into_iter().map(|candidate| {
        MetricSample::gauge(
            "cron_status",
            "Status of cronjob last run",
            (candidate == status).into(),
        )
        .with_label("code", candidate.code().to_string())
        .with_label("status", candidate.as_label())
    }));

    samples.extend(ExitCode::NAMED.into_iter().map(|(candidate, name)| {
        MetricSample::gauge(
            "cron_exit",
            "Exit of cronjob last run",
            (candidate == exit_code).into(),
        )
        .with_label("code", candidate.value().to_string())
        .with_label("exit", name)
    }));

    samples
}

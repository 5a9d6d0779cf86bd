mod phase;
pub use phase::RunPhase;

use std::{fmt, future::Future, io::Write};

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cron_exec::{ExecOutcome, Executor};
use cron_model::{
    CommandLine, ExitCode, Namespace, RunRecord, RunStatus, Stamp, metric_prefix,
    validate_code_tables,
};

use crate::{CoreError, MetricsHandle, RunnerConfig, SignalListener, TerminationSignal};

/// Which side of the race resolved first.
enum Verdict {
    Completed(Result<ExecOutcome, JoinError>),
    Signalled(TerminationSignal),
}

/// Drives one run of one command.
pub struct Runner {
    config: RunnerConfig,
    executor: Executor,
    metrics: MetricsHandle,
    record: RunRecord,
    phase: RunPhase,
}

impl Runner {
    /// Build a runner for `args` (program first).
    ///
    /// Fails with [`cron_model::ModelError::EmptyCommand`] when `args` is empty
    /// and [`cron_model::ModelError::InvalidPrefix`] when the configured prefix
    /// cannot start a metric name.
    pub fn new(
        args: Vec<String>,
        config: RunnerConfig,
        metrics: MetricsHandle,
    ) -> Result<Self, CoreError> {
        validate_code_tables()?;
        let command = CommandLine::new(args)?;
        metric_prefix(config.metrics_prefix.as_deref())?;
        let record = RunRecord::new(command, config.timeout, config.dry_run);

        Ok(Self {
            config,
            executor: Executor::new(),
            metrics,
            record,
            phase: RunPhase::Init,
        })
    }

    /// Replace the executor (e.g. to plug in a different spawn classifier).
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the command, ending early on SIGINT, SIGTERM or SIGHUP.
    ///
    /// Only a metrics failure is returned as an error once the run has started;
    /// the record is finalized either way.
    pub async fn run(&mut self) -> Result<(), CoreError> {
        let listener = match SignalListener::install() {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("signal handlers unavailable; run cannot be interrupted cleanly: {e}");
                None
            }
        };

        self.run_until(async move {
            match listener {
                Some(mut listener) => listener.recv().await,
                None => std::future::pending().await,
            }
        })
        .await
    }

    /// Like [`Runner::run`], with `shutdown` standing in for signal delivery.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), CoreError>
    where
        F: Future<Output = TerminationSignal>,
    {
        if self.phase != RunPhase::Init {
            return Err(CoreError::AlreadyStarted(self.phase));
        }
        self.start()?;

        if self.config.dry_run {
            self.print_dry_run_report(&mut std::io::stdout().lock());
            self.phase = RunPhase::DryRun;
            return Ok(());
        }

        let (status, exit_code) = self.race(shutdown).await;
        self.record.complete(status, exit_code)?;
        self.phase = RunPhase::Finished(status);

        self.finish()
    }

    fn start(&mut self) -> Result<(), CoreError> {
        let started_at = Stamp::now();
        let namespace = Namespace::derive(&self.config.namespace, self.record.command().as_slice());
        let prefix = metric_prefix(self.config.metrics_prefix.as_deref())?;

        info!(
            namespace = %namespace,
            command = %self.record.command(),
            timeout_secs = self.config.timeout.as_secs(),
            "run started",
        );
        self.record.start(started_at, namespace, prefix)?;
        self.phase = RunPhase::Running;
        Ok(())
    }

    /// Race the executor against `shutdown`; the first to resolve decides the outcome.
    async fn race<F>(&self, shutdown: F) -> (RunStatus, ExitCode)
    where
        F: Future<Output = TerminationSignal>,
    {
        let cancel = CancellationToken::new();
        let mut worker = tokio::spawn({
            let executor = self.executor.clone();
            let command = self.record.command().clone();
            let deadline = self.config.timeout;
            let cancel = cancel.clone();
            async move { executor.execute(&command, deadline, cancel).await }
        });

        let verdict = tokio::select! {
            joined = &mut worker => Verdict::Completed(joined),
            signal = shutdown => Verdict::Signalled(signal),
        };

        // A signal win says nothing about the child; it may still be running.
        cancel.cancel();

        match verdict {
            Verdict::Completed(Ok(outcome)) => (outcome.status, outcome.exit_code),
            Verdict::Completed(Err(e)) => {
                error!("executor task failed: {e}");
                (RunStatus::Fail, ExitCode::UNKNOWN)
            }
            Verdict::Signalled(signal) => {
                warn!(%signal, "termination signal received; stopping command");
                if let Err(e) = worker.await {
                    debug!("executor task failed during teardown: {e}");
                }
                (RunStatus::Terminated, signal.exit_code())
            }
        }
    }

    fn finish(&mut self) -> Result<(), CoreError> {
        self.record.finalize(Stamp::now())?;
        self.phase = RunPhase::Finalized;

        info!(
            status = %self.record.status(),
            exit_code = %self.record.exit_code(),
            duration_ms = self.record.duration().as_millis() as u64,
            "run finished",
        );

        if !self.config.metrics_enabled {
            debug!("metrics disabled; skipping emission");
            return Ok(());
        }
        self.metrics.publish(&self.record)?;
        Ok(())
    }

    /// Write the dry-run report to `out`; a failed write is logged, not fatal.
    fn print_dry_run_report(&self, out: &mut impl Write) {
        if let Err(e) = out
            .write_all(self.dry_run_report().as_bytes())
            .and_then(|()| out.flush())
        {
            warn!("failed to print dry-run report: {e}");
        }
    }

    /// Lines printed instead of running the command in dry-run mode.
    pub fn dry_run_report(&self) -> String {
        let mut out = String::new();
        if let Some(prefix) = self.record.prefix() {
            out.push_str(&format!("DRYRUN: Metric Prefix: {prefix}\n"));
        }
        if let Some(namespace) = self.record.namespace() {
            out.push_str(&format!("DRYRUN: Metric Namespace: {namespace}\n"));
        }
        out.push_str(&format!(
            "DRYRUN: Args: [{}]\n",
            self.record.command().as_slice().join(" ")
        ));
        out.push_str(&format!(
            "DRYRUN: Timeout: {}\n",
            self.config.timeout.as_secs()
        ));
        out
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("record", &self.record)
            .field("metrics", &"<handle>")
            .finish()
    }
}

#[cfg(test)]
mod tests;

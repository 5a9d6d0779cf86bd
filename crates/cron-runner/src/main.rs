use std::{process::ExitCode, sync::Arc};

use anyhow::anyhow;
use tracing::{debug, error};

use cron_core::{ConfigError, CoreError, Runner, RunnerConfig};
use cron_observe::{LoggerConfig, init_local_offset, init_logger};
use cron_prometheus::TextfileMetrics;

fn main() -> anyhow::Result<ExitCode> {
    // 1) local offset has to be read while the process is single-threaded
    init_local_offset();

    // 2) metric files: world-readable, not world-writable
    #[cfg(unix)]
    // SAFETY: umask only swaps the process file-mode mask; no threads exist yet
    // that could race on it.
    unsafe {
        libc::umask(0o022);
    }

    // 3) arguments, help, config
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow!("argument is not valid UTF-8: {arg:?}"))
        })
        .collect::<anyhow::Result<Vec<String>>>()?;

    if args.len() == 1 && args[0] == "help" {
        print!("{}", help_text(RunnerConfig::from_env()));
        return Ok(ExitCode::SUCCESS);
    }
    let config = RunnerConfig::from_env()?;

    // 4) logger
    init_logger(&LoggerConfig::from_env()?)?;

    // 5) runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args, config))
}

async fn run(args: Vec<String>, config: RunnerConfig) -> anyhow::Result<ExitCode> {
    let metrics = Arc::new(TextfileMetrics::new(&config.metrics_dir));
    let policy = config.exit_code_policy;
    let mut runner = Runner::new(args, config, metrics)?;

    match runner.run().await {
        Ok(()) => {}
        // the run itself is over and recorded; only the file is missing
        Err(CoreError::Metrics(e)) => error!("failed to write metrics: {e}"),
        Err(e) => return Err(e.into()),
    }

    let code = policy.process_code(runner.record());
    debug!(phase = %runner.phase(), code, "exiting");
    Ok(ExitCode::from(code))
}

/// Usage for `help`; an unreadable environment shows the defaults and the error.
fn help_text(config: Result<RunnerConfig, ConfigError>) -> String {
    match config {
        Ok(config) => usage(&config),
        Err(e) => format!("{}\nConfig error: {e}\n", usage(&RunnerConfig::default())),
    }
}

fn usage(config: &RunnerConfig) -> String {
    let prefix = config.metrics_prefix.as_deref().unwrap_or_default();
    format!(
        "Usage: cron-runner <any-command-or-script> [args]\n\
         Example: CRON_DRYRUN=true cron-runner echo 'hello world'\n\
         Example: cron-runner php /path/to/script.php\n\
         \n\
         Config Options (set as env vars):\n  \
         CRON_TIMEOUT: {timeout}\n  \
         CRON_METRICS: {metrics}\n  \
         CRON_METRICS_PREFIX: {prefix}\n  \
         CRON_NAMESPACE: {namespace}\n  \
         CRON_METRICS_DIR: {dir}\n  \
         CRON_DRYRUN: {dryrun}\n  \
         CRON_EXIT_CODE_POLICY: {policy}\n\
         \n\
         Logging (stderr):\n  \
         CRON_LOG_FORMAT: text|json|journald\n  \
         CRON_LOG_LEVEL: tracing filter, default warn\n  \
         CRON_LOG_TZ: utc|local\n",
        timeout = config.timeout.as_secs(),
        metrics = config.metrics_enabled,
        namespace = config.namespace,
        dir = config.metrics_dir.display(),
        dryrun = config.dry_run,
        policy = config.exit_code_policy,
    )
}

use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::{CommandLine, ExitCode, ModelError, Namespace, RunStatus};

/// A point in time read from both clocks.
///
/// `wall` feeds the epoch gauges; durations are taken from `mono` only, so a
/// stepped system clock cannot distort them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub wall: OffsetDateTime,
    pub mono: Instant,
}

impl Stamp {
    pub fn new(wall: OffsetDateTime, mono: Instant) -> Self {
        Self { wall, mono }
    }

    pub fn now() -> Self {
        Self::new(OffsetDateTime::now_utc(), Instant::now())
    }
}

/// Metadata of a single supervised run.
///
/// Created when the runner is constructed, filled in as the run progresses and
/// frozen by [`RunRecord::finalize`]; every mutator fails afterwards.
#[derive(Debug, Clone)]
pub struct RunRecord {
    command: CommandLine,
    timeout: Duration,
    dry_run: bool,
    started_at: Option<Stamp>,
    ended_at: Option<Stamp>,
    duration: Duration,
    status: RunStatus,
    exit_code: ExitCode,
    namespace: Option<Namespace>,
    prefix: Option<String>,
    finalized: bool,
}

impl RunRecord {
    pub fn new(command: CommandLine, timeout: Duration, dry_run: bool) -> Self {
        Self {
            command,
            timeout,
            dry_run,
            started_at: None,
            ended_at: None,
            duration: Duration::ZERO,
            status: RunStatus::Unknown,
            exit_code: ExitCode::UNKNOWN,
            namespace: None,
            prefix: None,
            finalized: false,
        }
    }

    /// Record the start of the run along with its frozen naming.
    pub fn start(
        &mut self,
        at: Stamp,
        namespace: Namespace,
        prefix: Option<String>,
    ) -> Result<(), ModelError> {
        self.ensure_open()?;
        self.started_at = Some(at);
        self.namespace = Some(namespace);
        self.prefix = prefix;
        self.status = RunStatus::Running;
        Ok(())
    }

    /// Record the terminal outcome.
    pub fn complete(&mut self, status: RunStatus, exit_code: ExitCode) -> Result<(), ModelError> {
        self.ensure_open()?;
        self.status = status;
        self.exit_code = exit_code;
        Ok(())
    }

    /// Stamp the end time, compute the duration and freeze the record.
    ///
    /// The duration is measured on the monotonic clock; an unstarted record
    /// gets zero.
    pub fn finalize(&mut self, at: Stamp) -> Result<(), ModelError> {
        self.ensure_open()?;
        self.ended_at = Some(at);
        self.duration = self
            .started_at
            .map_or(Duration::ZERO, |start| at.mono.saturating_duration_since(start.mono));
        self.finalized = true;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ModelError> {
        if self.finalized {
            return Err(ModelError::RecordFinalized);
        }
        Ok(())
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.started_at.map(|s| s.wall)
    }

    pub fn ended_at(&self) -> Option<OffsetDateTime> {
        self.ended_at.map(|s| s.wall)
    }

    /// Start time in seconds since the epoch, `0` before the run started.
    pub fn start_unix(&self) -> i64 {
        self.started_at.map_or(0, |s| s.wall.unix_timestamp())
    }

    /// End time in seconds since the epoch, `0` before finalization.
    pub fn end_unix(&self) -> i64 {
        self.ended_at.map_or(0, |s| s.wall.unix_timestamp())
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use time::Duration as TimeDuration;

    use super::*;

    fn record() -> RunRecord {
        RunRecord::new(
            CommandLine::new(["sleep", "1"]).unwrap(),
            Duration::from_secs(60),
            false,
        )
    }

    fn epoch(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(secs).unwrap()
    }

    #[test]
    fn new_record_is_unknown() {
        let r = record();
        assert_eq!(r.status(), RunStatus::Unknown);
        assert_eq!(r.exit_code(), ExitCode::UNKNOWN);
        assert_eq!(r.start_unix(), 0);
        assert!(r.namespace().is_none());
        assert!(!r.is_finalized());
    }

    #[test]
    fn lifecycle_fills_fields() {
        let mut r = record();
        let start = Stamp::new(epoch(1_700_000_000), Instant::now());
        let end = Stamp::new(
            start.wall + TimeDuration::milliseconds(1500),
            start.mono + Duration::from_millis(1500),
        );
        let ns = Namespace::parse("sleep_1").unwrap();

        r.start(start, ns.clone(), Some("team_".into())).unwrap();
        assert_eq!(r.status(), RunStatus::Running);

        r.complete(RunStatus::Success, ExitCode::SUCCESS).unwrap();
        r.finalize(end).unwrap();

        assert_eq!(r.namespace(), Some(&ns));
        assert_eq!(r.prefix(), Some("team_"));
        assert_eq!(r.duration(), Duration::from_millis(1500));
        assert_eq!(r.start_unix(), 1_700_000_000);
        assert_eq!(r.end_unix(), 1_700_000_001);
        assert!(r.is_finalized());
    }

    #[test]
    fn finalized_record_rejects_changes() {
        let mut r = record();
        r.finalize(Stamp::now()).unwrap();

        assert!(matches!(
            r.complete(RunStatus::Fail, ExitCode::FAIL_GENERIC),
            Err(ModelError::RecordFinalized)
        ));
        assert!(r.finalize(Stamp::now()).is_err());
        assert_eq!(r.status(), RunStatus::Unknown);
        assert_eq!(r.duration(), Duration::ZERO);
    }

    #[test]
    fn stepped_wall_clock_does_not_change_duration() {
        let mut r = record();
        let start = Stamp::new(epoch(1_700_000_000), Instant::now());
        // 5s of real time pass while the system clock is stepped back 10s.
        let end = Stamp::new(
            start.wall - TimeDuration::seconds(5),
            start.mono + Duration::from_secs(5),
        );

        r.start(start, Namespace::parse("x").unwrap(), None).unwrap();
        r.finalize(end).unwrap();

        assert_eq!(r.duration(), Duration::from_secs(5));
        assert_eq!(r.end_unix(), 1_699_999_995);
    }
}

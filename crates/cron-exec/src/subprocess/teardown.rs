use tokio::process::Child;
use tracing::debug;

/// Kill the child together with everything it spawned, then reap it.
///
/// The child leads its own process group, so the group kill reaches shell
/// wrappers' descendants as well. No grace period is given.
pub(crate) async fn teardown(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        kill_process_group(pid);
    }

    if let Err(e) = child.kill().await {
        debug!("failed to kill child: {e}");
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions; pgid is the group the
    // child created for itself at spawn time.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            pgid,
            "killpg failed: {}",
            std::io::Error::last_os_error()
        );
    }
}

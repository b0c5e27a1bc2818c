//! Interrupt detection for the run controller
//!
//! [`wait_for_interrupt`] completes with the name of the first termination
//! signal the process receives.
//!
//! On Unix this is SIGINT, SIGTERM or SIGQUIT, with
//! [`tokio::signal::ctrl_c`] as a fallback. Elsewhere only Ctrl-C is
//! observed.

/// Wait for a termination signal and return its name
#[cfg(unix)]
pub async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Wait for a termination signal and return its name
#[cfg(not(unix))]
pub async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Resolve once a signal arrives; never resolve if signals are unavailable
///
/// Used as the interrupt future of a run: failing to install handlers
/// must not look like an interrupt.
pub async fn interrupted() {
    match wait_for_interrupt().await {
        Ok(name) => tracing::info!(signal = name, "Interrupted, finalizing report"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}

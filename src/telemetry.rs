//! Opt-in `tracing` setup for hosts embedding `chart-plotters`.
//!
//! Render passes log at `debug` (pass start/end, chart creation) and `trace`
//! (per group, per axis, per series). Skipped geometry such as non-positive
//! log values or extra funnel series logs at `warn`.

/// Environment variable read by [`init_default_tracing`].
pub const LOG_ENV: &str = "CHART_PLOTTERS_LOG";

/// Installs a compact subscriber filtered by [`LOG_ENV`], falling back to
/// `chart_plotters=warn`.
///
/// Returns `false` when the `telemetry` feature is off or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| "chart_plotters=warn".to_owned());
    init_tracing(&directive)
}

/// Installs a compact subscriber with an explicit filter directive such as
/// `chart_plotters::api=debug`.
#[must_use]
pub fn init_tracing(directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let Ok(filter) = tracing_subscriber::EnvFilter::try_new(directive) else {
            return false;
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directive;
        false
    }
}

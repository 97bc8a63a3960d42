//! Telemetry helpers for applications embedding `multiplot-rs`.
//!
//! Tracing setup stays explicit and opt-in: call one of the initializers
//! below, or wire your own `tracing` subscriber and filters in the host
//! application.

/// Initializes a default `tracing` subscriber when the `telemetry` feature
/// is enabled, honoring `RUST_LOG` and falling back to `info`.
///
/// Returns `true` when initialization succeeds, `false` when nothing was
/// installed (feature disabled, or the host already set a global subscriber).
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with("info")
}

/// Like [`init_default_tracing`], but with an explicit fallback filter
/// directive (e.g. `"multiplot_rs=debug"`).
#[must_use]
pub fn init_tracing_with(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_filter)),
            )
            .with_target(false)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}

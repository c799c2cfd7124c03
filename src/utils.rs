pub mod tracing {
    use std::fmt;

    use tracing_subscriber::{EnvFilter, FmtSubscriber, fmt::time::FormatTime};

    struct LocalTimeOnly;

    impl FormatTime for LocalTimeOnly {
        fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
            let now = chrono::Local::now();
            write!(w, "{}", now.format("%H:%M:%S"))
        }
    }

    /// Installs the global subscriber. `RUST_LOG` overrides the "info" default.
    /// Returns false when a subscriber was already set by the embedding app.
    pub fn init() -> bool {
        let subscriber = FmtSubscriber::builder()
            .with_timer(LocalTimeOnly)
            .compact()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .finish();

        ::tracing::subscriber::set_global_default(subscriber).is_ok()
    }

    pub fn init_test(level: &str) {
        let subscriber = FmtSubscriber::builder()
            .without_time()
            .compact()
            .with_test_writer()
            .with_env_filter(EnvFilter::new(level))
            .finish();

        let _ = ::tracing::subscriber::set_global_default(subscriber);
    }
}

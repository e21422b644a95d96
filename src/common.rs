use std::{io, sync::Once};

use thiserror::Error;

/// Host-level failures of the front end. Language errors never end up here:
/// syntax problems are parser diagnostics and runtime problems are
/// `Object::Error` values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Usage(String),
}

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`, e.g.
/// `RUST_LOG=monkey_lang=debug`. Does nothing when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

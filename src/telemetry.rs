//! Library-scoped tracing support for host binaries.
//!
//! The gateway itself only emits `tracing` events; subscriber setup belongs
//! to the embedding application. This module offers a preconfigured fmt
//! layer that renders ONLY events originating from this crate, so a host can
//! compose it with its own global subscriber without double-printing.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "chat_gateway";

/// Compact RFC3339 UTC timer (`2026-08-06T10:20:30Z`), via `chrono`.
#[derive(Clone, Debug, Default)]
struct Rfc3339Utc;

impl FormatTime for Rfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Builds a formatting layer scoped to this crate's events.
///
/// Single-line compact output with RFC3339 UTC timestamps, target, and
/// `file:line`; ANSI colors only when stdout is a terminal. Other crates'
/// events pass through untouched for the host's own layers to handle.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(Rfc3339Utc)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// Builds an `EnvFilter` from the environment (or `default` as fallback)
/// with an extra per-crate level directive for this library.
///
/// `env_filter_with_level("info", Level::DEBUG)` shows INFO globally and
/// DEBUG for the gateway only.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let directive = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    let directive = Directive::from_str(&directive).expect("valid level directive");
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default))
        .add_directive(directive)
}

//! Arrange Core
//!
//! Core components of the arrange C# source normalizer: the lossless syntax
//! tree, diagnostics, configuration, file discovery and error types.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod discovery;
pub mod document;
pub mod error;
pub mod result;

// Re-export commonly used types
pub use config::{
    ArrangeConfig, ConfigFormat, ConfigLoader, FileMatcher, FilesConfiguration,
    RulesConfiguration,
};
pub use diagnostics::{
    Diagnostic, DiagnosticProvider, ExternalDiagnostics, Severity, UNNECESSARY_USING,
    UnusedUsingAnalyzer,
};
pub use discovery::FileDiscovery;
pub use document::{CSHARP, Document};
pub use error::{ArrangeError, ErrorKind};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"warn"`)
/// is used.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second initialization (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! dbshift observability surface.
//!
//! Two channels with distinct contracts:
//!
//! - [`LogStream`] — the append-only, ordered activity log. This is the
//!   correctness-bearing record of every verification and migration
//!   outcome; subscribers replay the full history and then receive live
//!   appends.
//! - [`Notifier`] — advisory, short human-readable notices with a
//!   severity, intended for transient presentation (banners, toasts).
//!   Best-effort only; nothing may depend on delivery.

pub mod log;
pub mod notify;

pub use log::{LogEntry, LogLevel, LogStream};
pub use notify::{Notice, Notifier, Severity};

//! Level-filtered logging.
//!
//! Lines are formatted lazily and handed to one registered backend together
//! with their level. The crate owns no console: on target the platform
//! installs a UART writer, under the host test runner the tests crate
//! installs a stderr writer. Until then every line is discarded.
//!
//! A backend writes one whole line per call, newline included, without
//! interleaving with lines from other CPUs. The GPIO service routine logs,
//! so a backend must not take a lock that thread context holds with the
//! GPIO line unmasked.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use spin::RwLock;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    const ALL: [Self; 5] = [
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    fn from_raw(raw: u8) -> Self {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(Self::Trace)
    }

    /// Fixed-width tag for line prefixes.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Parse a level name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.tag().trim_end().eq_ignore_ascii_case(name))
    }
}

/// Sink for one formatted line.
pub type KlogBackend = fn(KlogLevel, fmt::Arguments<'_>);

static LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::Info as u8);
static BACKEND: RwLock<Option<KlogBackend>> = RwLock::new(None);

/// Install `backend`, replacing any previous one.
pub fn klog_register_backend(backend: KlogBackend) {
    *BACKEND.write() = Some(backend);
}

/// Reset the threshold to `Info`.
pub fn klog_init() {
    klog_set_level(KlogLevel::Info);
}

pub fn klog_set_level(level: KlogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(LEVEL.load(Ordering::Relaxed))
}

#[inline]
pub fn klog_is_enabled(level: KlogLevel) -> bool {
    level as u8 <= LEVEL.load(Ordering::Relaxed)
}

/// Emit one line at `level`. Format strings carry no trailing newline.
pub fn log_args(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !klog_is_enabled(level) {
        return;
    }
    let backend = *BACKEND.read();
    if let Some(backend) = backend {
        backend(level, args);
    }
}

#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::klog::log_args($level, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Error, $($arg)*) };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Info, $($arg)*) };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! klog_trace {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Trace, $($arg)*) };
}

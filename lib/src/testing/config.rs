const DEFAULT_ENABLED: bool = true;
const DEFAULT_VERBOSITY: Verbosity = Verbosity::Summary;
const DEFAULT_TIMEOUT_MS: u32 = 0;
const DEFAULT_THREADS: u32 = 4;
const DEFAULT_ITERATIONS: u32 = 100;
const DEFAULT_LATENCY_SAMPLES: u32 = 100;
const DEFAULT_TOGGLE_ITERATIONS: u32 = 1_000_000;
const DEFAULT_READ_ITERATIONS: u32 = 2_000_000;
const DEFAULT_BENCH_SAMPLES: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Summary,
    Verbose,
}

impl Verbosity {
    pub fn from_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("quiet") {
            Verbosity::Quiet
        } else if value.eq_ignore_ascii_case("verbose") {
            Verbosity::Verbose
        } else {
            Verbosity::Summary
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Summary => "summary",
            Verbosity::Verbose => "verbose",
        }
    }
}

impl core::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters shared by the GPIO validation, stress and benchmark suites.
#[derive(Clone, Copy, Debug)]
pub struct TestConfig {
    pub enabled: bool,
    pub verbosity: Verbosity,
    /// Per-suite budget; `0` disables the check.
    pub timeout_ms: u32,
    /// Worker threads in the race-condition stress test.
    pub threads: u32,
    /// Configuration rounds per stress worker.
    pub iterations: u32,
    /// Edges measured by the interrupt latency test.
    pub latency_samples: u32,
    pub toggle_iterations: u32,
    pub read_iterations: u32,
    /// Calls timed per configuration benchmark.
    pub bench_samples: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENABLED,
            verbosity: DEFAULT_VERBOSITY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            threads: DEFAULT_THREADS,
            iterations: DEFAULT_ITERATIONS,
            latency_samples: DEFAULT_LATENCY_SAMPLES,
            toggle_iterations: DEFAULT_TOGGLE_ITERATIONS,
            read_iterations: DEFAULT_READ_ITERATIONS,
            bench_samples: DEFAULT_BENCH_SAMPLES,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("enabled")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("disabled")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

fn parse_count(value: &str, slot: &mut u32) {
    if let Ok(parsed) = value.parse::<u32>() {
        if parsed != 0 {
            *slot = parsed;
        }
    }
}

pub fn config_from_cmdline(cmdline: Option<&str>) -> TestConfig {
    let mut cfg = TestConfig::default();
    if let Some(cmdline) = cmdline {
        for token in cmdline.split_whitespace() {
            if let Some(value) = token.strip_prefix("gpiotests=") {
                // Any non-boolean value (e.g. a suite name) just enables tests.
                cfg.enabled = parse_bool(value).unwrap_or(true);
            } else if let Some(value) = token.strip_prefix("gpiotests.verbosity=") {
                cfg.verbosity = Verbosity::from_str(value);
            } else if let Some(value) = token.strip_prefix("gpiotests.timeout=") {
                if let Ok(parsed) = value.trim_end_matches("ms").parse::<u32>() {
                    cfg.timeout_ms = parsed;
                }
            } else if let Some(value) = token.strip_prefix("gpiotests.threads=") {
                parse_count(value, &mut cfg.threads);
            } else if let Some(value) = token.strip_prefix("gpiotests.iterations=") {
                parse_count(value, &mut cfg.iterations);
            } else if let Some(value) = token.strip_prefix("gpiotests.samples=") {
                parse_count(value, &mut cfg.latency_samples);
            } else if let Some(value) = token.strip_prefix("gpiotests.toggles=") {
                parse_count(value, &mut cfg.toggle_iterations);
            } else if let Some(value) = token.strip_prefix("gpiotests.reads=") {
                parse_count(value, &mut cfg.read_iterations);
            } else if let Some(value) = token.strip_prefix("gpiotests.bench=") {
                parse_count(value, &mut cfg.bench_samples);
            }
        }
    }
    cfg
}

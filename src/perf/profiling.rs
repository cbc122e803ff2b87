/// Global call counters for the rendering pipeline.
/// Counters are always present; they are only incremented when the
/// `profiling` feature is enabled, so release builds pay nothing.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_counters {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        /// Thread-safe counters for pipeline stages.
        pub struct FunctionCounters {
            $($(#[$doc])* pub $name: AtomicU64,)*
        }

        impl FunctionCounters {
            pub const fn new() -> Self {
                Self {
                    $($name: AtomicU64::new(0),)*
                }
            }

            /// Reset all counters to zero.
            pub fn reset(&self) {
                $(self.$name.store(0, Ordering::Relaxed);)*
            }

            /// Snapshot of all counters.
            pub fn snapshot(&self) -> CounterSnapshot {
                CounterSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }
        }

        /// Counter values at a point in time.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct CounterSnapshot {
            $(pub $name: u64,)*
        }
    };
}

define_counters! {
    draw_calls,
    triangles_submitted,
    /// Rejected by the back-face test.
    triangles_culled,
    /// Fully outside the frustum after clipping.
    triangles_clipped_away,
    polygons_rasterized,
    scanlines,
    pixels_tested,
    depth_passed,
    depth_failed,
    depth_clears,
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSnapshot {
    /// Fraction of depth tests that passed, if any ran.
    pub fn depth_pass_rate(&self) -> Option<f64> {
        let total = self.depth_passed + self.depth_failed;
        (total > 0).then(|| self.depth_passed as f64 / total as f64)
    }

    /// Emit the report through the `log` facade at info level.
    pub fn log_report(&self) {
        log::info!("{self}");
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Render Counters ===")?;
        writeln!(f, "Geometry:")?;
        writeln!(f, "  draw calls:             {:12}", self.draw_calls)?;
        writeln!(f, "  triangles submitted:    {:12}", self.triangles_submitted)?;
        writeln!(f, "  triangles culled:       {:12}", self.triangles_culled)?;
        writeln!(f, "  triangles clipped away: {:12}", self.triangles_clipped_away)?;
        writeln!(f, "  polygons rasterized:    {:12}", self.polygons_rasterized)?;
        writeln!(f, "Pixels:")?;
        writeln!(f, "  scanlines:              {:12}", self.scanlines)?;
        writeln!(f, "  pixels tested:          {:12}", self.pixels_tested)?;
        writeln!(f, "  depth test passed:      {:12}", self.depth_passed)?;
        writeln!(f, "  depth test failed:      {:12}", self.depth_failed)?;
        if let Some(rate) = self.depth_pass_rate() {
            writeln!(f, "  depth test pass rate:   {:11.2}%", rate * 100.0)?;
        }
        write!(f, "  depth buffer clears:    {:12}", self.depth_clears)
    }
}

/// Global counters instance.
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Increment a counter by one (only when the profiling feature is enabled).
#[macro_export]
macro_rules! count_call {
    ($counter:ident) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$counter
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Add to a counter (only when the profiling feature is enabled).
#[macro_export]
macro_rules! count_add {
    ($counter:ident, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$counter
                .fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

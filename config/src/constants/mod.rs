//! Centralized configuration values shared across the surface-graph service.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// WELDING
// =============================================================================

/// Default distance under which two mesh vertex occurrences are welded into a
/// single graph vertex.
///
/// Most mesh formats duplicate a vertex once per distinct normal/UV, so
/// without welding the edge graph falls apart into one component per face.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_WELD_TOLERANCE;
/// assert!(DEFAULT_WELD_TOLERANCE > 0.0);
/// assert!(DEFAULT_WELD_TOLERANCE < 1.0e-3);
/// ```
pub const DEFAULT_WELD_TOLERANCE: f64 = 1.0e-6;

// =============================================================================
// SPATIAL INDEX
// =============================================================================

/// Multiplier applied to the estimated mean vertex spacing when sizing the
/// cells of the nearest-vertex grid. Larger values = fewer cells but more
/// vertices per cell.
///
/// # Examples
/// ```
/// use config::constants::SPATIAL_CELL_SIZE_FACTOR;
/// assert!(SPATIAL_CELL_SIZE_FACTOR >= 1.0);
/// ```
pub const SPATIAL_CELL_SIZE_FACTOR: f64 = 2.0;

/// Lower bound for the nearest-vertex grid cell size.
///
/// # Examples
/// ```
/// use config::constants::MIN_SPATIAL_CELL_SIZE;
/// assert!(MIN_SPATIAL_CELL_SIZE > 0.0);
/// ```
pub const MIN_SPATIAL_CELL_SIZE: f64 = 1.0e-9;

// =============================================================================
// WORKERS
// =============================================================================

/// Prefix of the OS thread name given to each context's graph worker. The
/// context id is appended.
///
/// # Examples
/// ```
/// use config::constants::GRAPH_WORKER_THREAD_PREFIX;
/// let name = format!("{GRAPH_WORKER_THREAD_PREFIX}torso");
/// assert!(name.ends_with("torso"));
/// ```
pub const GRAPH_WORKER_THREAD_PREFIX: &str = "surface-graph-";

/// Number of vertices or triangles a build processes between two checks of
/// its cancellation probe.
///
/// # Examples
/// ```
/// use config::constants::BUILD_CANCEL_CHECK_INTERVAL;
/// assert!(BUILD_CANCEL_CHECK_INTERVAL.is_power_of_two());
/// ```
pub const BUILD_CANCEL_CHECK_INTERVAL: usize = 4096;

/// Default number of readiness events buffered for slow subscribers before
/// they start lagging.
///
/// # Examples
/// ```
/// use config::constants::READINESS_CHANNEL_CAPACITY;
/// assert!(READINESS_CHANNEL_CAPACITY >= 16);
/// ```
pub const READINESS_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// RUNTIME CONFIGURATION
// =============================================================================

/// How the welding distance of a mesh is chosen.
///
/// # Examples
/// ```
/// use config::constants::WeldTolerance;
/// let absolute = WeldTolerance::Absolute(1.0e-4);
/// assert_eq!(absolute.resolve(500.0), 1.0e-4);
///
/// let relative = WeldTolerance::RelativeToBounds(1.0e-3);
/// assert!((relative.resolve(10.0) - 1.0e-2).abs() < 1.0e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeldTolerance {
    /// Fixed distance in mesh units.
    Absolute(f64),
    /// Fraction of the mesh bounding-box diagonal.
    RelativeToBounds(f64),
}

impl WeldTolerance {
    /// Resolves the welding distance for a mesh whose bounding-box diagonal
    /// has the given length.
    ///
    /// A relative tolerance on a zero-sized mesh falls back to
    /// [`DEFAULT_WELD_TOLERANCE`].
    pub fn resolve(self, bounds_diagonal: f64) -> f64 {
        match self {
            WeldTolerance::Absolute(eps) => eps,
            WeldTolerance::RelativeToBounds(fraction) => {
                let eps = fraction * bounds_diagonal;
                if eps > 0.0 && eps.is_finite() {
                    eps
                } else {
                    DEFAULT_WELD_TOLERANCE
                }
            }
        }
    }

    /// Checks that the tolerance is a positive, finite number.
    ///
    /// # Examples
    /// ```
    /// use config::constants::WeldTolerance;
    /// assert!(WeldTolerance::Absolute(1.0e-6).validate().is_ok());
    /// assert!(WeldTolerance::Absolute(-1.0).validate().is_err());
    /// ```
    pub fn validate(self) -> Result<Self, ConfigError> {
        let value = match self {
            WeldTolerance::Absolute(v) | WeldTolerance::RelativeToBounds(v) => v,
        };
        if value > 0.0 && value.is_finite() {
            Ok(self)
        } else {
            Err(ConfigError::InvalidTolerance(value))
        }
    }
}

impl Default for WeldTolerance {
    fn default() -> Self {
        WeldTolerance::Absolute(DEFAULT_WELD_TOLERANCE)
    }
}

/// Immutable snapshot of the service configuration.
///
/// Fields are only reachable through [`ServiceConfig::new`] and
/// [`ServiceConfig::default`], so every instance holds validated values.
///
/// # Examples
/// ```
/// use config::constants::ServiceConfig;
/// let config = ServiceConfig::default();
/// assert!(config.readiness_capacity() > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    weld_tolerance: WeldTolerance,
    readiness_capacity: usize,
}

impl ServiceConfig {
    /// Builds a configuration enforcing strict validation of the supplied
    /// tolerance and channel capacity.
    ///
    /// # Examples
    /// ```
    /// use config::constants::{ServiceConfig, WeldTolerance};
    /// let cfg = ServiceConfig::new(WeldTolerance::Absolute(1.0e-5), 8).expect("valid config");
    /// assert_eq!(cfg.readiness_capacity(), 8);
    /// ```
    pub fn new(
        weld_tolerance: WeldTolerance,
        readiness_capacity: usize,
    ) -> Result<Self, ConfigError> {
        let weld_tolerance = weld_tolerance.validate()?;
        if readiness_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(readiness_capacity));
        }
        Ok(Self {
            weld_tolerance,
            readiness_capacity,
        })
    }

    /// Welding tolerance applied to every mesh handed to the service.
    pub fn weld_tolerance(&self) -> WeldTolerance {
        self.weld_tolerance
    }

    /// Capacity of the readiness broadcast channel, always at least 1.
    pub fn readiness_capacity(&self) -> usize {
        self.readiness_capacity
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            weld_tolerance: WeldTolerance::default(),
            readiness_capacity: READINESS_CHANNEL_CAPACITY,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when a tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
    /// Raised when a channel capacity is zero.
    InvalidCapacity(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "weld tolerance must be positive and finite: {value}")
            }
            ConfigError::InvalidCapacity(value) => {
                write!(f, "readiness capacity must be > 0: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

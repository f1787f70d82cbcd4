//! # Config Crate
//!
//! Centralized configuration constants for the surface-graph shortest-path
//! service. Welding tolerances, spatial index tuning and worker settings are
//! defined here so the graph core and the service layer agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{ServiceConfig, WeldTolerance, DEFAULT_WELD_TOLERANCE};
//!
//! let cfg = ServiceConfig::default();
//! assert_eq!(cfg.weld_tolerance(), WeldTolerance::Absolute(DEFAULT_WELD_TOLERANCE));
//!
//! // A tolerance that follows the model's scale instead
//! let scaled = ServiceConfig::new(WeldTolerance::RelativeToBounds(1.0e-7), 16).unwrap();
//! assert_eq!(scaled.readiness_capacity(), 16);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Validated**: Runtime configuration is checked on construction
//! - **Dependency-Free**: Safe to pull into any crate of the workspace

pub mod constants;

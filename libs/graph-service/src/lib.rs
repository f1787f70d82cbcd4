//! # Graph Service
//!
//! Background construction and querying of surface graphs, one context per
//! mesh.
//!
//! ## Architecture
//!
//! ```text
//! GeodesicService
//!   └── ContextRegistry (RwLock<HashMap<id, GraphContext>>)
//!         └── GraphContext
//!               ├── status: watch<ContextStatus>  ← single source of readiness
//!               └── worker thread ← mpsc<WorkerRequest>
//! ```
//!
//! - Each context owns one OS worker thread that builds the graph and its
//!   spatial index, then answers off-thread path requests.
//! - Readiness is published through a watch channel; `Ready` and `Failed`
//!   are also broadcast as [`ReadinessEvent`]s.
//! - Synchronous queries clone the resident model out of the watch channel,
//!   so they never block on a build and finish even if the context is
//!   disposed meanwhile.
//!
//! No `tracing` subscriber is installed here; the host application decides
//! where logs go.

pub mod context;
pub mod error;
pub mod events;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod status;
mod worker;

pub use context::GraphContext;
pub use error::{ContextError, ContextResult};
pub use events::{ContextId, ContextState, ReadinessEvent};
pub use protocol::{WorkerRequest, WorkerResponse};
pub use registry::ContextRegistry;
pub use service::GeodesicService;
pub use status::{ContextStatus, ReadinessHandle};

pub use surface_graph::{GraphSummary, MeshData, SurfaceHit, SurfacePath, VertexIndex};

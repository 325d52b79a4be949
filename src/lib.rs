#![cfg_attr(docsrs, feature(doc_cfg))]
//! # grainflow
//!
//! grainflow is the core of a materials-microstructure processing pipeline:
//! runtime-typed numeric arrays organized into attribute groups and data
//! containers, a two-phase (dry run, then execute) step contract with a
//! sequential runner, and the mesh connectivity builders several steps rely
//! on.
//!
//! ## Features
//! - [`TypedArray`](data::TypedArray): one element type chosen at runtime, a
//!   `tuples x components` shape, and tag-checked typed access
//! - [`AttributeGroup`](data::AttributeGroup) /
//!   [`DataContainer`](data::DataContainer) /
//!   [`DataContainerRegistry`](data::DataContainerRegistry) addressed by
//!   `container/group/array` paths
//! - [`PipelineStep`](pipeline::PipelineStep) and
//!   [`PipelineRunner`](pipeline::PipelineRunner): shape-only dry runs,
//!   polled status codes, cooperative cancellation
//! - Vertex links, element neighbor lists and grid-binned feature
//!   neighborhoods in [`algs`]
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! grainflow = "0.3"
//! # Optional features:
//! # features = ["rayon", "check-invariants"]
//! ```
//!
//! ```
//! use grainflow::prelude::*;
//!
//! let mut registry = DataContainerRegistry::new();
//! registry
//!     .create_container("dc")?
//!     .create_group("CellData", GroupKind::Cell)?
//!     .resize_all(8)?;
//!
//! let mut pipeline = Pipeline::new("example");
//! pipeline.push(Box::new(CreateDataArray::new(
//!     ScalarType::I32,
//!     1,
//!     1.0,
//!     "dc/CellData/Phases".parse::<DataArrayPath>()?,
//! )));
//!
//! let runner = PipelineRunner::new(RunnerConfig::default());
//! runner
//!     .run(&mut pipeline, &mut registry, &NullObserver)
//!     .map_err(|f| PipelineError::Generic(f.to_string()))?;
//! assert_eq!(
//!     registry.resolve(&"dc/CellData/Phases".parse::<DataArrayPath>()?)?.number_of_tuples(),
//!     8
//! );
//! # Ok::<(), grainflow::pipeline_error::PipelineError>(())
//! ```
//!
//! ## Determinism
//!
//! Neighbor lists are always sorted ascending, and groups and containers
//! iterate in name order, so repeated runs on the same input produce
//! identical registries.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod filters;
pub mod geometry;
pub mod pipeline;
pub mod pipeline_error;

pub use debug_invariants::DebugInvariants;

static_assertions::assert_impl_all!(data::TypedArray: Send, Sync);
static_assertions::assert_impl_all!(data::AttributeGroup: Send, Sync);
static_assertions::assert_impl_all!(data::DataContainerRegistry: Send, Sync);
static_assertions::assert_impl_all!(pipeline::CancellationToken: Send, Sync);

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::element_neighbors::{ElementNeighborOpts, ElementNeighbors};
    pub use crate::algs::neighborhoods::{
        BinningStrategy, NeighborhoodOpts, Neighborhoods, find_neighborhoods,
    };
    pub use crate::algs::vertex_links::VertexLinks;
    pub use crate::data::{
        AttributeGroup, DataArrayPath, DataContainer, DataContainerRegistry, GroupKind,
        NeighborList, ScalarType, TypedArray,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::filters::{
        CreateDataArray, FindElementNeighbors, FindNeighborhoods, RemoveComponentFromArray,
    };
    pub use crate::geometry::{Geometry, GeometryKind, InvalidateCache};
    pub use crate::pipeline::{
        CancellationToken, LogObserver, NullObserver, ParameterValue, Pipeline, PipelineObserver,
        PipelineRunner, PipelineStep, RunnerConfig, StepMessage,
    };
    pub use crate::pipeline_error::PipelineError;
}

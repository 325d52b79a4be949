//! Data model: typed arrays, attribute groups, containers and the registry.
#![warn(missing_docs)]

pub mod attribute_group;
pub mod container;
pub mod neighbor_list;
pub mod path;
pub mod registry;
pub mod scalar;
pub mod typed_array;

pub use attribute_group::{AttributeGroup, GroupKind};
pub use container::DataContainer;
pub use neighbor_list::NeighborList;
pub use path::DataArrayPath;
pub use registry::DataContainerRegistry;
pub use scalar::{ArrayBuffer, Scalar, ScalarType};
pub use typed_array::{ArrayShape, ResizeMode, TypedArray};

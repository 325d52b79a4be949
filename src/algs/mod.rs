//! Connectivity algorithms: vertex links, element neighbors, edge
//! extraction and spatial-binning neighborhoods.

pub mod edges;
pub mod element_neighbors;
pub mod neighborhoods;
pub mod vertex_links;

pub use edges::{boundary_edges, unique_edges};
pub use element_neighbors::{ElementNeighborOpts, ElementNeighbors};
pub use neighborhoods::{
    BinningStrategy, NeighborhoodOpts, Neighborhoods, find_neighborhoods, find_neighborhoods_with,
};
pub use vertex_links::VertexLinks;

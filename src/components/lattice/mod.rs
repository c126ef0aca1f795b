//! The layered curriculum view: document model, lineage, layout, projection
//! and the retained SVG scene with its particle overlay.

mod camera;
mod component;
mod layout;
pub mod lineage;
mod particles;
mod projection;
mod render;
pub mod scene;
mod state;
mod types;

pub use component::LatticeView;
pub use lineage::Impact;
pub use state::ViewTransform;
#[cfg(test)]
pub(crate) use types::{GraphLink, node};
pub use types::{DocumentError, GraphDocument, LAYER_COUNT, NodeId, layer_color};

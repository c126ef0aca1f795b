mod component;
mod render;
mod state;
mod types;

pub use component::RadialInspector;
pub use types::InspectorData;

pub mod inspector;
pub mod lattice;

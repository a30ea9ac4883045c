pub mod adapters;
pub mod batch;
pub mod core;
pub mod decoder;
pub mod error;
pub mod schema;
pub mod shredder;

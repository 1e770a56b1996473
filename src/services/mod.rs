// Service module exports

pub mod persistence;
pub mod settings;
pub mod share;
pub mod store;

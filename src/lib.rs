pub mod api;
pub mod config;
pub mod definitions;
pub mod error;
pub mod models;
pub mod net;
pub mod services;
pub mod state;

// Convenient re-exports (so call sites can do `deliverator::Registry`, etc.)
pub use state::{
    registry::Registry,
    store::{Mutation, Store},
};

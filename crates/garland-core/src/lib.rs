//! Core building blocks shared by Garland binaries.
//!
//! Configuration, the gate engine, and persistence live here so downstream
//! crates can focus on presentation surfaces instead of reimplementing the
//! unlock rules.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod service;
pub mod store;

pub use catalog::{Catalog, Media, Ornament};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigFormat, GarlandConfig, DEFAULT_CONFIG_PATH};
pub use error::{GarlandError, GarlandResult};
pub use gate::{GateState, UnlockOutcome};
pub use service::{
    AdminPromptOutcome, ContentView, GarlandService, OrnamentView, RenderIntent, UnlockReport,
};
pub use store::StateStore;

//! Runtime settings read from the environment (and `.env`, when present).

mod settings;

pub use settings::{Settings, StoreBackend};

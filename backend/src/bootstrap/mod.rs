//! Process startup: layered settings and reference data seeding.

mod config;
mod startup;

pub use config::{DEFAULT_PORT, ServiceSettings, SettingsError};
pub use startup::{StartupSeedingError, seed_reference_data_on_startup};

//! Registry service configuration

pub mod registry;

pub use registry::RegistryConfig;

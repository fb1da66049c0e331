pub mod aggregate;
pub mod location;
pub mod settings;
pub mod snapshot;

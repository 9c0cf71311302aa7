pub mod components;
pub mod host;

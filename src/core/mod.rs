pub mod client;
pub mod diff;
pub mod error;
pub mod ports;
pub mod reconciler;
pub mod record;
pub mod secret_string_option;

pub mod events;
pub mod identity;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The serving substrate: projection of the routing graph into discovery
//! resources, versioned per-family caches, the debounced rebuild loop, and
//! the streaming discovery server.

pub mod cache;
pub mod endpoints;
pub mod handler;
pub mod project;
pub mod resource;
pub mod server;

pub use self::cache::{Caches, ResourceCache};
pub use self::endpoints::EndpointsTranslator;
pub use self::handler::EventHandler;
pub use self::project::ListenerConfig;
pub use self::resource::ResourceType;

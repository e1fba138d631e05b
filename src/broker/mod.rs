pub mod engine;
pub mod reaper;
pub mod registry;
pub mod session;

pub use engine::TopicBroker;
pub use registry::ConnectionRegistry;

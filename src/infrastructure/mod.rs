//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod memory;
pub mod persistence;
pub mod view;

pub use adapters::{FakeGradingClient, HttpGradingClient, HttpGradingClientConfig};
pub use events::{EventPublisher, ViewEvent};
pub use memory::InMemoryKeyValueStore;
pub use persistence::sled::SledKeyValueStore;
pub use view::ConsoleView;

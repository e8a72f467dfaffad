//! Event Publishing - 界面事件广播

mod publisher;

pub use publisher::{EventPublisher, ViewEvent};

//! Memory Layer - In-Memory State Management
//!
//! 实现 KeyValueStore 的内存版本，用于测试与 --offline 模式

mod key_value_store;

pub use key_value_store::InMemoryKeyValueStore;

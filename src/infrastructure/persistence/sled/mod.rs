//! Sled 存储实现

mod key_value_store;

pub use key_value_store::{SledKeyValueStore, SledStoreConfig};

//! History Context - 主题偏好

use serde::{Deserialize, Serialize};

/// 界面主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// 存储值：暗色模式为 "enabled"
    pub fn as_stored(&self) -> &'static str {
        match self {
            Theme::Dark => "enabled",
            Theme::Light => "disabled",
        }
    }

    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "enabled" => Some(Theme::Dark),
            "disabled" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_values() {
        assert_eq!(Theme::Dark.as_stored(), "enabled");
        assert_eq!(Theme::from_stored("disabled"), Some(Theme::Light));
        assert_eq!(Theme::from_stored("on"), None);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
    }
}

//! View Layer - 终端展示

mod console_view;

pub use console_view::ConsoleView;

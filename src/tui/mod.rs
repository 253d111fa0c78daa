//! Ratatui 终端 UI 模块
//!
//! 基于 ratatui 的媒体查看器。

pub mod app;
pub mod components;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::TuiApp;
pub use event::TuiEvent;
pub use theme::{Theme, theme};
pub use ui::render;

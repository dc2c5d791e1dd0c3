//! 配置管理

mod r#impl;
mod structs;

pub use structs::*;

#![allow(dead_code)]

pub mod fake_manager;
pub mod http_stub;

pub use fake_manager::*;
pub use http_stub::*;

//! CLI 서브커맨드 구현.

pub mod list;
pub mod providers;
pub mod run;

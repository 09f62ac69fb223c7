//! Core engine: the scan loop and the scan-then-notify pipeline.

pub mod scanner;
pub mod screener;

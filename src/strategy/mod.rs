//! Screening strategy.
//!
//! A single fixed heuristic: the latest candle must be a wide,
//! body-dominated bar relative to the 8-period ATR.

pub mod atr;
pub mod breakout;

pub use breakout::evaluate;

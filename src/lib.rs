//! # cybercalc
//!
//! A terminal calculator built around a shunting-yard expression evaluator.
//! [`calc_engine`] holds the evaluator; the other modules provide the
//! editing session, history, themes and settings the front-ends share.

pub mod calc_engine;
pub mod calculator;
pub mod config;
pub mod history;
pub mod session;
pub mod themes;

pub use calc_engine::{parse, CalcError};

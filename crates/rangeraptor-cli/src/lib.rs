//! Range-Raptor CLI library.
//!
//! Terminal styling and journey formatting for the `rangeraptor-cli`
//! binary. The search itself lives in `rangeraptor-lib`.

pub mod output;
pub mod terminal;

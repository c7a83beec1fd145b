//! Rule, file and property exclusions for a static-analysis client, kept in a
//! flat string-keyed preference store.
pub mod builders;
pub mod core;
pub mod utils;

#[cfg(test)]
mod tests;

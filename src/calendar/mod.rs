//! The calendar core: unlock policy, content catalog, cell state, selection,
//! and the session that ties them together.

pub mod catalog;
pub mod gating;
pub mod selection;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_properties;

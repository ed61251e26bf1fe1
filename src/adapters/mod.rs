//! Adapter implementations of the port traits.

pub mod live;
#[cfg(test)]
pub(crate) mod testing;

//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod outline;

pub(crate) use build::BuildArgs;
pub(crate) use outline::OutlineArgs;

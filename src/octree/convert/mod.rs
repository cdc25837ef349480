#[cfg(feature = "bytecode")]
pub mod bytecode;

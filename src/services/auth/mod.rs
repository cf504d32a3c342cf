pub mod token_gate;

pub use token_gate::{Claims, GateError, TokenGate};

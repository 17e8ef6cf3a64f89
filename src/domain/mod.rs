pub mod completion;
pub mod order;
pub mod ports;

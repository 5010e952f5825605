pub mod address;
pub mod bus;
pub mod cli;
pub mod command;
pub mod connman;
pub mod error;
pub mod ipv4;
pub mod model;
pub mod printer;
pub mod variant;

pub mod command;
pub mod focus;

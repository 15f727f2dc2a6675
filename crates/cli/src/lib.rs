pub mod bootstrap;
pub mod cli;
pub mod state_file;

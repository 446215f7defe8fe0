pub mod entry;
pub mod help;
pub mod output;
pub mod status;

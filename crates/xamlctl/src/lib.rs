pub mod cmd_parse;
pub mod cmd_resources;
pub mod cmd_types;
pub mod common;

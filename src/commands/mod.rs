// commands/mod.rs

pub mod common_args;
pub mod drop;
pub mod generate;
pub mod generate_one;
pub mod init;
pub mod lookup;
pub mod mail;
pub mod make_template;
pub mod tables;
pub mod templates;
pub mod upload;

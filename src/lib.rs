#![forbid(unsafe_code)]

pub mod canon;
pub mod check;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod logging;
pub mod parser;
pub mod patterns;
pub mod rtf;
pub mod scripture;
pub mod setup;
pub mod show;
pub mod source;
pub mod store;
pub mod validate;

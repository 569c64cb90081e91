#![allow(clippy::module_inception)]
pub mod cli;
pub mod output;
pub mod runner;

//! Kaniko CLI - command-line front end for the executor wrapper.

pub mod commands;

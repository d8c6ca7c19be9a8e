//! openapi-gen library
//!
//! Renders code, clients and docs from an OpenAPI document through sets of
//! composable templates. The binary is a thin clap front end over
//! [`core::generate::run`].
#![deny(unsafe_code)]

pub mod core;

//! CAWI respondent portal web server.
//!
//! This crate provides the HTTP surface of the portal: access-code login,
//! session-gated instrument routes, server-rendered pages and the
//! configuration that wires them together.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod headers;
pub mod pages;

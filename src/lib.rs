//! Refund Desk - guided refund requests for festival pass holders
//!
//! The wizard state machine lives in [`refund`], backend access in
//! [`backend`], and the HTTP surface in [`rest`].

pub mod backend;
pub mod config;
pub mod logging;
pub mod refund;
pub mod rest;

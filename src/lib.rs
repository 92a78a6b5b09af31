//! Core library for the callrecon command line application.
//!
//! The library reconciles dialer call attempts against contact files and an
//! occurrence lookup, then reports campaign outcomes per phone and per
//! service. Responsibilities are kept narrow: IO adapters live under
//! [`io`], the tabular representation inside [`model`], phone normalisation
//! in [`phone`], contact layout detection in [`layout`], the joins in
//! [`reconcile`], outcome precedence in [`classify`], the report tables in
//! [`report`], one-file orchestration in [`pipeline`] and the directory-level
//! run under [`batch`].

pub mod batch;
pub mod classify;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod phone;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use error::{Result, ToolError};

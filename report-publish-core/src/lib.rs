#![doc = "report-publish-core: core logic library for report-publish."]

//! This crate holds the storage-agnostic pipeline that turns a build report
//! (one file or a directory tree) into a set of bucket objects with a single
//! entry point.
//!
//! # Usage
//! Call [`publish::publish`] with any [`contract::StorageBackend`], or use the
//! building blocks directly: [`entry_point::select_entry_point`] then
//! [`upload::upload_all`].

pub mod archive;
pub mod content_type;
pub mod contract;
pub mod entry_point;
pub mod error;
pub mod materialize;
pub mod paths;
pub mod publish;
pub mod source;
pub mod upload;

pub use error::PublishError;

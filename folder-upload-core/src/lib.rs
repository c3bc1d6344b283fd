#![doc = "folder-upload-core: discovery and concurrent upload pipeline for folder-upload."]

//! This crate holds the pipeline that mirrors a local directory tree into a bucket:
//! exclusion-aware discovery, a bounded pool of upload workers, and key derivation.
//! Store clients live behind the [`contract::ObjectStore`] trait; the S3 client and the
//! command line live in the `folder-upload` crate.
//!
//! # Usage
//! Build a [`contract::TransferSpec`] and an [`contract::ExclusionSet`], then call
//! [`transfer::transfer`] with any store implementation.

pub mod contract;
pub mod discover;
pub mod key;
pub mod pool;
pub mod transfer;

pub use contract::{ExclusionSet, ObjectStore, StoreError, TransferSpec, UploadTask};
pub use transfer::{transfer, TransferError};

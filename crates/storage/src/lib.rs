//! Storage layer for geosearch
//!
//! This crate provides the device-local persistence collaborator: a sled
//! key-value store and schema-keyed object stores built on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod persistence;

pub use kv::{KvConfig, KvError, KvStore};
pub use persistence::{
    FileObjectStore, FileStoreConfig, KvObjectStore, ObjectStore, PersistenceError,
};

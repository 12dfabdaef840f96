//! Coordinated copy/paste for text editors.
//!
//! On copy, registered providers attach extra data to the clipboard under
//! a correlation handle. On paste, data carrying the same handle is merged
//! back in and paste providers get a chance to replace the default paste
//! with an edit of their own.

pub mod builtin;
pub mod config;
pub mod controller;
pub mod document;
pub mod host;
pub mod platform;
pub mod provider;
pub mod simulate;
pub mod transfer;

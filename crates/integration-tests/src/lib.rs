//! Integration tests for the Itadaki workspace.
//!
//! The tests live in `tests/` and exercise cross-crate behavior that does
//! not need a live database or network: the sync contract, permission
//! semantics, configuration masking, shell selection, and persisted-shape
//! round trips.

#![cfg_attr(not(test), forbid(unsafe_code))]

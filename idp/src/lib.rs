// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # IdP Bootstrap
//!
//! Populates an identity provider's trust store with the metadata of every
//! configured service provider before the IdP starts relying on it.
//!
//! ## Architecture
//!
//! ```text
//! config (id -> url) -> Bootstrap -> one task per SP
//!                                      |
//!                                      +-> Retry(Backoff(Registrar))
//!                                             |
//!                                             +-> HttpFetcher (GET metadata)
//!                                             +-> Store (/services/<id>)
//! ```
//!
//! ## Modules
//!
//! - [`application`]: HTTP server setup with Axum
//! - [`bootstrap`]: Concurrent orchestration with a global deadline
//! - [`configuration`]: CLI arguments (clap) and the JSON IdP config file
//! - [`constants`]: Defaults and limits
//! - [`errors`]: Error types, including HTTP response mapping
//! - [`fetcher`]: Single-shot metadata GET
//! - [`models`]: Provider sources and stored service records
//! - [`registrar`]: Well-formedness check and store write
//! - [`retry`]: Retry and backoff wrappers around an attempt
//! - [`routes`]: HTTP route handlers (health, services)
//! - [`store`]: Store capability and the in-memory implementation
//!
//! ## Usage
//!
//! ```bash
//! idp-bootstrap -c /etc/idp/idp.json --bootstrap-timeout 3m --backoff 2s
//! ```
//!
//! Any bootstrap failure is fatal: an IdP with an incomplete set of service
//! providers exits non-zero instead of serving.

pub mod application;
pub mod bootstrap;
pub mod configuration;
pub mod constants;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod registrar;
pub mod retry;
pub mod routes;
pub mod store;

//! Retrieval-augmented chatbot service answering questions about
//! DAFMAN 36-2664 from a local copy of the publication.
//!
//! The crate is split hexagonally: `domain` holds entities and ports,
//! `application` the ingest and query services, `infrastructure` the
//! adapters behind the ports, and `api` the HTTP surface.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

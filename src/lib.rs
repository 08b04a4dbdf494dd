//! earnwire: collect earnings-call transcripts from configured news
//! sources and deliver them as a JSON artifact or an email digest.
//!
//! The pipeline is fetch -> extract -> aggregate -> report. Components are
//! stateless across runs; the only persisted thing is the opaque session
//! blob handled by `fetcher::session`.

pub mod aggregator;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod output;
pub mod reporter;

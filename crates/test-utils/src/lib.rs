//! Shared test utilities: capability document fixtures and a scripted
//! HTTP fetcher.

pub mod fetcher;
pub mod fixtures;

pub use fetcher::StaticFetcher;

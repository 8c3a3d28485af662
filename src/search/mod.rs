//! Search Module
//!
//! Paper retrieval for the research stage. arXiv is the only source: its
//! export API lists recent submissions and links each entry to a PDF.

pub mod arxiv;

pub use arxiv::{ArxivClient, ArxivPaper};

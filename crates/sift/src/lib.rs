//! sift: structured search queries for record collections.
//!
//! sift turns a single-line query such as `title:"The Hobbit" price>=10 -author:rowling`
//! into a token stream, a boolean tree and a flat list of conditions. The `sift` binary
//! exposes the parser for inspection and applies queries to JSON records read from a file
//! or stdin.

#![warn(missing_docs)]

pub mod cli;

//! Command-line interface for texmix question parsing
//!
//! This crate provides the `texmix` command-line tool, which parses question
//! text (prose with LaTeX math, environments, images and
//! `**Part (a) [2 marks]**` markers) into Markdown, JSON or YAML, checks every
//! math span against a syntax checker, and lists or rewrites image URLs.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/texmix-cli
//! ```
//!
//! # Commands
//!
//! ## `parse` - Structured Output
//!
//! ```bash
//! # Markdown to stdout
//! texmix parse question.tex
//!
//! # Pretty JSON to a file
//! texmix parse question.tex -f json -o question.json
//!
//! # From stdin, without splitting Part markers
//! cat question.tex | texmix parse - --no-parts
//! ```
//!
//! ## `check` - Typesetting Check
//!
//! ```bash
//! # Report how each math span typesets; --strict fails on literal fallbacks
//! texmix check question.tex --strict
//! ```
//!
//! ## `images` - Image Directives
//!
//! ```bash
//! # List image URLs
//! texmix images question.tex
//!
//! # Show CDN upload locations
//! texmix images question.tex --cdn-base https://cdn.example.net --question-id q42
//!
//! # Point every directive at a new URL
//! texmix images question.tex --rewrite https://cdn.example.net/fig.png
//! ```
//!
//! # Configuration
//!
//! Defaults come from the first of `--config <FILE>`, `./.texmix.toml` and
//! `~/.texmix.toml`; command-line flags override the file.
//!
//! ```toml
//! [parse]
//! max_depth = 16
//! split_parts = true
//!
//! [output]
//! format = "json"   # markdown, json, or yaml
//! pretty = true
//!
//! [typeset]
//! unsupported_commands = ["\\cfrac"]
//!
//! [images]
//! cdn_base = "https://cdn.example.net"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Error, or `check --strict` found spans that only render as text
//! - `2` - Invalid arguments

pub mod config;

pub use config::{Config, OutputFormat};

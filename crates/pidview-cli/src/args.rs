//! Command-line argument definitions for the PIDView CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects between rendering a view of a
//! diagram and validating a tag map against one.

use clap::{Parser, Subcommand};

/// Command-line arguments for the PIDView tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a diagram, fitted to a view and composed with an overlay, to SVG
    Render {
        /// Path to the input SVG diagram
        input: String,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,

        /// Overlay JSON to compose over the diagram
        #[arg(long)]
        overlay: Option<String>,

        /// View width in pixels
        #[arg(long, default_value_t = 1024.0)]
        width: f32,

        /// View height in pixels
        #[arg(long, default_value_t = 768.0)]
        height: f32,

        /// Zoom steps applied after fitting; negative values zoom out
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        zoom: i32,
    },

    /// Check a tag map against a diagram and print the findings
    Validate {
        /// Path to the tag map (TOML)
        tag_map: String,

        /// Path to the SVG diagram the tags refer to
        diagram: String,
    },
}

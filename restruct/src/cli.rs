//! Command-line interface definitions for restruct

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::scanner::HeadingLevel;
use crate::transforms::split::SplitMethod;

/// CLI structure for the restruct application
#[derive(Parser)]
#[command(name = "restruct")]
#[command(version)]
#[command(about = "Batch restructuring tool for marked-up text documents", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for restruct
#[derive(Subcommand)]
pub enum Commands {
    /// Run a restructuring pipeline over a directory of documents
    Run {
        /// Input directory containing .txt/.html documents
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Pipeline description file
        #[arg(short, long, default_value = "pipeline.toml")]
        pipeline: PathBuf,

        /// Output ZIP archive
        #[arg(short, long, default_value = "restructured.zip")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Scan documents for split candidates and write an editable plan
    Scan {
        /// Input directory containing .txt/.html documents
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// How split boundaries are detected
        #[arg(short, long, value_enum, default_value = "tag")]
        method: SplitMethod,

        /// Heading tag for the heading-based methods
        #[arg(short, long, value_enum, default_value = "h2")]
        tag: HeadingLevel,

        /// Heading substring or literal text, depending on the method
        #[arg(short, long, default_value = "")]
        pattern: String,

        /// Author name injected below each split heading
        #[arg(long, default_value = "")]
        author: String,

        /// Collection name prefixed to fragment titles
        #[arg(long, default_value = "")]
        book: String,

        /// Comma-separated phrases excluding headings from candidacy
        #[arg(long, default_value = "")]
        exclude: String,

        /// Where to write the review plan
        #[arg(long, default_value = "split_plan.toml")]
        plan: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Apply a curated split plan and export the result
    Commit {
        /// Input directory containing .txt/.html documents
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// The curated review plan to apply
        #[arg(long, default_value = "split_plan.toml")]
        plan: PathBuf,

        /// Output ZIP archive
        #[arg(short, long, default_value = "restructured.zip")]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

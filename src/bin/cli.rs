// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! stlmesh CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use stlmesh::io::{self, StlFormat, WriteOptions};
use stlmesh::{find_connected_components, to_indexed, Component};

#[derive(Parser)]
#[command(name = "stlmesh")]
#[command(about = "Inspect, convert and analyse STL meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print format, triangle, vertex and component counts
    Info {
        /// Input STL file
        input: String,
    },

    /// Re-encode an STL file
    Convert {
        /// Input STL file
        input: String,

        /// Output STL file
        #[arg(short, long)]
        output: String,

        /// Output format (binary, ascii); overrides the config file
        #[arg(short, long)]
        format: Option<StlFormat>,

        /// TOML file with writer options
        #[arg(short, long)]
        config: Option<String>,
    },

    /// List the vertex-connected components of a mesh
    Components {
        /// Input STL file
        input: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Serialize)]
struct ComponentSummary {
    index: usize,
    faces: usize,
    vertices: usize,
}

impl ComponentSummary {
    fn new(index: usize, component: &Component) -> Self {
        let vertices: HashSet<u32> = component
            .iter()
            .flat_map(|face| face.indices)
            .collect();
        Self {
            index,
            faces: component.len(),
            vertices: vertices.len(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Info { input } => info_command(input)?,
        Commands::Convert {
            input,
            output,
            format,
            config,
        } => convert_command(input, output, *format, config.as_deref(), cli.verbose)?,
        Commands::Components { input, json } => components_command(input, *json)?,
        Commands::Version => println!("stlmesh v{}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}

fn load(input: &str) -> Result<(StlFormat, stlmesh::TriangleSoup)> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to open STL file: {}", input))?;
    let format = io::detect_format(&bytes);
    let triangles = io::decode(&bytes).with_context(|| format!("Failed to parse STL file: {}", input))?;
    Ok((format, triangles))
}

fn info_command(input: &str) -> Result<()> {
    let (format, triangles) = load(input)?;
    let mesh = to_indexed(&triangles);
    let components = find_connected_components(&mesh.vertices, &mesh.faces);

    println!("{} {}", "File:".bold(), input.cyan());
    println!("  {:<12} {}", "Format", format.to_string().green());
    println!("  {:<12} {}", "Triangles", triangles.len());
    println!("  {:<12} {}", "Vertices", mesh.vertex_count());
    println!("  {:<12} {}", "Components", components.len());

    Ok(())
}

fn convert_command(
    input: &str,
    output: &str,
    format: Option<StlFormat>,
    config: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let mut options = match config {
        Some(path) => WriteOptions::from_file(path)?,
        None => WriteOptions::default(),
    };
    if let Some(format) = format {
        options.format = format;
    }

    let start = Instant::now();
    let (source_format, triangles) = load(input)?;
    io::try_write_with(output, &triangles, &options)
        .with_context(|| format!("Failed to write STL file: {}", output))?;

    println!(
        "{} {} ({}) -> {} ({}), {} triangles",
        "✓".green(),
        input,
        source_format,
        output.cyan(),
        options.format,
        triangles.len()
    );
    if verbose {
        println!("Converted in {:.2?}", start.elapsed());
    }

    Ok(())
}

fn components_command(input: &str, json: bool) -> Result<()> {
    let (_, triangles) = load(input)?;
    let mesh = to_indexed(&triangles);
    let summaries: Vec<ComponentSummary> = find_connected_components(&mesh.vertices, &mesh.faces)
        .iter()
        .enumerate()
        .map(|(index, component)| ComponentSummary::new(index, component))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        input.cyan(),
        "-".bright_black(),
        format!("{} components", summaries.len()).bold()
    );
    for summary in &summaries {
        println!(
            "  #{:<4} {:>8} faces {:>8} vertices",
            summary.index, summary.faces, summary.vertices
        );
    }

    Ok(())
}

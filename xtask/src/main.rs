//! Build automation tasks for Biodash
//!
//! - Generating the CLI reference from the clap definitions

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for Biodash", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<biodash_cli::Cli>();

    let content = format!(
        r#"---
title: CLI Reference
description: Command reference for the biodash CLI
---

# Biodash CLI Reference

Generated from the CLI source code. Last updated: {}.

## Overview

`biodash` pulls every page of an occurrence search from a biological-records
API and prints a dashboard: records by month, top species, class and basis
breakdowns, species richness, a conservation-status cross-reference, map
coverage and data attribution.

## Quick Start

```bash
# Dashboard for one search
biodash fetch 'https://records-ws.nbnatlas.org/occurrences/search?q=*:*&fq=data_resource_uid:dr1'

# With a conservation-status list file
biodash fetch "$URL" --taxonomy ./bocc.json

# The records behind one row
biodash fetch "$URL" --drill month=2024-05
biodash fetch "$URL" --drill list=Red/Aves

# Machine-readable output
biodash fetch "$URL" --format json > report.json

# Show the status lists
biodash taxonomy --taxonomy ./bocc.json
```

## Commands

{}

## Environment Variables

- `BIODASH_API_URL` - Occurrence search URL used when `fetch` is given none
- `BIODASH_TAXONOMY` - Status taxonomy file (default: `./bocc.json`)
- `BIODASH_MAX_MAP_POINTS` - Map point limit, clamped to 100-20000 (default: `5000`)
- `BIODASH_PAGE_SIZE`, `BIODASH_MAX_PAGES` - Records per page (default: `500`) and page cap (default: `400`)
- `BIODASH_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: `60`)
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_FILTER` - Logging

A `.env` file in the working directory is read as well.

## Taxonomy File

```json
{{
  "lists": [
    {{ "list": "Red", "species": [
      {{ "name": "Curlew", "scientific": "Numenius arquata", "annotation": "BDp1" }}
    ] }}
  ]
}}
```

Every entry needs a scientific name. A name may appear on one list only.

---

*Generated by `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content).with_context(|| format!("Failed to write {}", file_path.display()))?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}

//! CLI tool for scanning and composing Google Slides presentations.

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use slides_core::{
    extract_folder_id, extract_presentation_id, service, ComposedPresentation, MemorySlides,
    SequenceRequest, SlidesAdapter,
};
use slides_google::{GoogleConfig, GoogleSlidesClient};
use std::collections::BTreeMap;
use std::time::Duration;

/// Scan slide markers and build presentations from slide sequences.
#[derive(Parser, Debug)]
#[command(name = "slides-tool")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// OAuth access token for the Slides and Drive APIs
    #[arg(long, global = true, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Slides API root
    #[arg(long, global = true, env = "SLIDES_API_BASE")]
    slides_api_base: Option<String>,

    /// Drive API root
    #[arg(long, global = true, env = "DRIVE_API_BASE")]
    drive_api_base: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, global = true, env = "SLIDES_TIMEOUT_SECS", default_value = "30")]
    timeout: u64,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List `$identifier` markers per slide
    Ids {
        /// Presentation URL or id
        presentation: String,
    },

    /// List `#component` markers on one slide
    Components {
        /// Presentation URL or id
        presentation: String,
        /// Zero-based slide index
        slide_index: usize,
    },

    /// List every slide with its object id and identifiers
    Slides {
        /// Presentation URL or id
        presentation: String,
    },

    /// Find the first slide carrying all the given identifiers
    Find {
        /// Presentation URL or id
        presentation: String,
        /// Identifiers, with or without the leading `$`
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Build a new presentation from a slide sequence
    Compose(ComposeArgs),

    /// Check that the token can read a presentation through both APIs
    Verify {
        /// Presentation URL or id
        presentation: String,
    },

    /// Delete a presentation, e.g. one left behind by a failed composition
    Discard {
        /// Presentation URL or id
        presentation: String,
    },
}

#[derive(ClapArgs, Debug)]
struct ComposeArgs {
    /// Source presentation URL or id
    presentation: String,

    /// Ordered source slide indices, e.g. 2,0,0
    #[arg(short, long, value_delimiter = ',', conflicts_with = "count", required_unless_present = "count")]
    sequence: Vec<usize>,

    /// Repeat a source slide: INDEX=N (slides not listed appear once, N=0 drops)
    #[arg(short, long, value_parser = parse_count)]
    count: Vec<(usize, usize)>,

    /// Destination folder URL or id
    #[arg(short, long)]
    folder: Option<String>,

    /// Name of the new presentation (default: "Copy of <source>")
    #[arg(short, long)]
    name: Option<String>,

    /// Delete the new presentation if composition fails after it was created
    #[arg(long)]
    discard_on_failure: bool,

    /// Compose against an in-memory copy of the source; nothing is written
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let client = build_client(&args)?;

    match &args.command {
        Command::Ids { presentation } => {
            let id = extract_presentation_id(presentation)?;
            let ids = service::extract_slide_ids(&client, &id).await?;
            if args.json {
                print_json(&ids)?;
            } else if ids.is_empty() {
                println!("No identifiers found");
            } else {
                for (index, tokens) in &ids {
                    println!("{}: {}", index, tokens.join(", "));
                }
            }
        }
        Command::Components {
            presentation,
            slide_index,
        } => {
            let id = extract_presentation_id(presentation)?;
            let components = service::slide_components(&client, &id, *slide_index).await?;
            if args.json {
                print_json(&components)?;
            } else {
                for component in &components {
                    println!("{}", component);
                }
            }
        }
        Command::Slides { presentation } => {
            let id = extract_presentation_id(presentation)?;
            let slides = service::list_slides(&client, &id).await?;
            if args.json {
                print_json(&slides)?;
            } else {
                for slide in &slides {
                    println!(
                        "{:>3}  {}  ({} elements)  {}",
                        slide.index,
                        slide.object_id,
                        slide.element_count,
                        slide.identifiers.iter().cloned().collect::<Vec<_>>().join(", ")
                    );
                }
            }
        }
        Command::Find {
            presentation,
            identifiers,
        } => {
            let id = extract_presentation_id(presentation)?;
            match service::find_slide(&client, &id, identifiers).await? {
                Some(index) if args.json => print_json(&index)?,
                Some(index) => println!("{}", index),
                None => bail!("No slide carries all of: {}", identifiers.join(", ")),
            }
        }
        Command::Compose(compose) => {
            let composed = run_compose(&client, compose).await?;
            if args.json {
                print_json(&composed)?;
            } else {
                println!("{}", composed.url);
            }
        }
        Command::Verify { presentation } => {
            let id = extract_presentation_id(presentation)?;
            let report = client.verify_access(&id).await;
            if args.json {
                print_json(&report)?;
            } else {
                println!("Slides API: {}", access_line(report.slides_api_access, &report.slides_api_error));
                println!("Drive API:  {}", access_line(report.drive_api_access, &report.drive_api_error));
                if let Some(name) = &report.file_name {
                    println!("File:       {}", name);
                }
                println!("Slides:     {}", report.slide_count);
            }
            if !report.overall_access {
                bail!("Presentation {} is not fully accessible", id);
            }
        }
        Command::Discard { presentation } => {
            let id = extract_presentation_id(presentation)?;
            client
                .delete_presentation(&id)
                .await
                .with_context(|| format!("Failed to delete {}", id))?;
            if args.verbose {
                eprintln!("Deleted: {}", id);
            }
        }
    }

    Ok(())
}

/// Build the Google client from global options.
fn build_client(args: &Args) -> Result<GoogleSlidesClient> {
    let token = args
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .context("No access token: set GOOGLE_ACCESS_TOKEN or pass --token")?;

    let mut config =
        GoogleConfig::new(token).with_timeout(Duration::from_secs(args.timeout));
    if let Some(base) = &args.slides_api_base {
        config = config.with_slides_base(base.as_str());
    }
    if let Some(base) = &args.drive_api_base {
        config = config.with_drive_base(base.as_str());
    }

    GoogleSlidesClient::new(config).context("Failed to create Google client")
}

/// Compose remotely, or against a memory copy of the source under `--dry-run`.
async fn run_compose(client: &GoogleSlidesClient, args: &ComposeArgs) -> Result<ComposedPresentation> {
    let source_id = extract_presentation_id(&args.presentation)?;
    let folder = match &args.folder {
        Some(folder) => Some(
            extract_folder_id(folder)
                .with_context(|| format!("Could not extract a folder id from: {}", folder))?,
        ),
        None => None,
    };

    if !args.dry_run {
        return compose_with(client, &source_id, folder, args).await;
    }

    let source = client
        .fetch_presentation(&source_id)
        .await
        .with_context(|| format!("Failed to fetch {}", source_id))?;
    let memory = MemorySlides::new();
    memory.insert(source);

    let composed = compose_with(&memory, &source_id, folder, args).await?;
    if let Some(result) = memory.get(&composed.presentation_id) {
        eprintln!("Dry run: {} slides in order:", result.slide_count());
        for (position, object_id) in result.slide_order().iter().enumerate() {
            eprintln!("{:>3}  {}", position, object_id);
        }
    }
    Ok(composed)
}

async fn compose_with<A: SlidesAdapter + ?Sized>(
    adapter: &A,
    source_id: &str,
    folder: Option<String>,
    args: &ComposeArgs,
) -> Result<ComposedPresentation> {
    let outcome = if args.count.is_empty() {
        let request = SequenceRequest {
            source_presentation_id: source_id.to_string(),
            target_container: folder,
            new_name: args.name.clone(),
            sequence: args.sequence.clone(),
        };
        service::compose_sequence(adapter, &request).await
    } else {
        let counts = counts_map(&args.count)?;
        service::compose_counts(adapter, source_id, &counts, folder, args.name.clone()).await
    };

    match outcome {
        Ok(composed) => Ok(composed),
        Err(e) => {
            log::error!("Composition failed ({}): {}", e.kind(), e);
            if let Some(target) = e.orphaned_target() {
                if args.discard_on_failure {
                    match adapter.delete_presentation(target).await {
                        Ok(()) => log::info!("Discarded partial presentation {}", target),
                        Err(cleanup) => log::warn!("Failed to discard {}: {}", target, cleanup),
                    }
                } else {
                    eprintln!("Partial presentation left at: {}", target);
                }
            }
            Err(e).context("Composition failed")
        }
    }
}

/// Parse an `INDEX=N` pair.
fn parse_count(s: &str) -> std::result::Result<(usize, usize), String> {
    let (index, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=N, got '{}'", s))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid slide index '{}'", index.trim()))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid count '{}'", count.trim()))?;
    Ok((index, count))
}

/// Collect `INDEX=N` pairs, rejecting an index given twice.
fn counts_map(pairs: &[(usize, usize)]) -> Result<BTreeMap<usize, usize>> {
    let mut counts = BTreeMap::new();
    for &(index, count) in pairs {
        if counts.insert(index, count).is_some() {
            bail!("Slide {} has more than one --count", index);
        }
    }
    Ok(counts)
}

fn access_line(ok: bool, error: &Option<String>) -> String {
    match (ok, error) {
        (true, _) => "ok".to_string(),
        (false, Some(e)) => format!("denied ({})", e),
        (false, None) => "denied".to_string(),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

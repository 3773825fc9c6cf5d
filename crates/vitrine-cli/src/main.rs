//! Vitrine CLI: manage product media galleries from the command line.
//!
//! Set VITRINE_API_URL (or API_URL) and VITRINE_ACCESS_TOKEN (or ACCESS_TOKEN).
//! Gallery limits come from the GALLERY_* variables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use vitrine_api_client::{delete_persisted_media, submit_gallery, ApiClient};
use vitrine_cli::{init_tracing, read_source_file, truncate_string, RejectedFile};
use vitrine_core::{AppError, Config, ErrorMetadata, MediaCursor, MediaId, Product};
use vitrine_gallery::{Gallery, InlinePreviewCodec, ItemRef};

#[derive(Parser)]
#[command(name = "vitrine", about = "Product media gallery CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally for one shop
    Products {
        #[arg(long)]
        shop: Option<String>,
    },
    /// Show a product's gallery in display order
    Show {
        /// Product ID
        product: String,
    },
    /// Stage local files and submit them to a product's gallery
    Upload {
        /// Product ID
        product: String,
        /// Image or video files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Make the Nth file (0-based) the primary item
        #[arg(long)]
        primary: Option<usize>,
    },
    /// Make a persisted item the primary one
    SetPrimary {
        /// Product ID
        product: String,
        /// Media ID
        media: String,
    },
    /// Delete a persisted item
    Delete {
        /// Product ID
        product: String,
        /// Media ID
        media: String,
    },
}

#[derive(Serialize)]
struct ProductSummary {
    id: String,
    name: String,
    shop_id: Option<String>,
    description: Option<String>,
    media: usize,
    primary: Option<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            shop_id: product.shop_id.clone(),
            description: product
                .description
                .as_deref()
                .map(|d| truncate_string(d, 60)),
            media: product.images.len(),
            primary: product.primary_or_first().map(|m| m.location),
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn load_gallery(client: &ApiClient, config: &Config, product_id: &str) -> anyhow::Result<Gallery> {
    let product = client
        .get_product(product_id)
        .await
        .with_context(|| format!("Failed to load product {}", product_id))?;
    Ok(Gallery::with_persisted(
        config.gallery.clone(),
        Arc::new(InlinePreviewCodec::new()),
        product.images,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let result = run().await;
    if let Err(err) = &result {
        if let Some(app_err) = err.downcast_ref::<AppError>() {
            tracing::error!(
                code = app_err.error_code(),
                action = app_err.suggested_action().unwrap_or_default(),
                "{}",
                app_err.client_message()
            );
        }
    }
    result
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let client = ApiClient::from_config(&config.api).context(
        "Failed to create API client. Set VITRINE_API_URL (or API_URL)",
    )?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Products { shop } => {
            let products = match shop.as_deref() {
                Some(shop_id) => client.list_shop_products(shop_id).await?,
                None => client.list_products().await?,
            };
            let summaries: Vec<ProductSummary> = products.iter().map(ProductSummary::from).collect();
            print_json(&summaries)?;
        }
        Commands::Show { product } => {
            let gallery = load_gallery(&client, &config, &product).await?;
            let entries = gallery.entries();
            let cursor = MediaCursor::new(entries.len());
            print_json(&serde_json::json!({
                "product_id": product,
                "position": cursor.label(),
                "remaining_capacity": gallery.remaining_capacity(),
                "items": entries,
            }))?;
        }
        Commands::Upload {
            product,
            files,
            primary,
        } => {
            let mut gallery = load_gallery(&client, &config, &product).await?;

            let mut sources = Vec::with_capacity(files.len());
            for path in &files {
                sources.push(read_source_file(path).await?);
            }
            let primary_name = primary
                .and_then(|index| sources.get(index))
                .map(|source| source.name.clone());

            let outcome = gallery.stage_files(sources).await;
            let rejected: Vec<RejectedFile> =
                outcome.rejections.iter().map(RejectedFile::from).collect();

            if let Some(name) = primary_name {
                let staged = outcome.accepted.iter().copied().find(|id| {
                    gallery
                        .staged_item(*id)
                        .is_some_and(|item| item.source().name == name)
                });
                match staged {
                    Some(id) => gallery.set_primary(&ItemRef::Staged(id))?,
                    None => tracing::warn!(file = %name, "Requested primary file was not staged"),
                }
            }

            let report = submit_gallery(&client, &mut gallery, &product).await?;
            print_json(&serde_json::json!({
                "created": report.created,
                "demoted": report.demoted,
                "promoted": report.promoted,
                "rejected": rejected,
            }))?;
        }
        Commands::SetPrimary { product, media } => {
            let mut gallery = load_gallery(&client, &config, &product).await?;
            gallery.set_primary(&ItemRef::Persisted(MediaId::new(media)))?;
            let report = submit_gallery(&client, &mut gallery, &product).await?;
            print_json(&report)?;
        }
        Commands::Delete { product, media } => {
            let mut gallery = load_gallery(&client, &config, &product).await?;
            let plan = delete_persisted_media(&client, &mut gallery, &product, &MediaId::new(media))
                .await?;
            print_json(&serde_json::json!({
                "success": true,
                "deleted": plan.delete,
                "promoted": plan.promote,
                "remaining": gallery.len(),
            }))?;
        }
    }

    Ok(())
}

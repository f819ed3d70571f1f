//! Catalog data generation for the Dorren door-hardware storefront.
//!
//! - Generation: `product_cards.csv` → scan → typed products → `products.ts`.
//! - Card building: warehouse stock sheet → `product_cards.csv` / `.json`.
//! - Catalog query and cart rules applied to the generated data.
//!
//! Data shape:
//! - `GenerationSummary { product_count, output, checksum }`
//! - Generated module: `Product` interface, `products`, `categories`, `brands`
#![cfg_attr(docsrs, feature(doc_cfg))]
//
pub mod cards;
mod cart;
mod catalog;
mod codec;
mod config;
mod emit;
mod io;
pub mod logging;
mod reader;
mod record;

pub use crate::cart::{Cart, Inquiry, InquiryLine};
pub use crate::catalog::{
    category_counts, find_by_slug, normalize_search_text, search, CatalogFilter, StockFilter,
};
pub use crate::config::{
    default_root, CardsConfig, EntityDefaults, GeneratorConfig, InputConfig, OutputConfig,
    PathsConfig, CONFIG_FILE_NAME, GENERIC_BRAND,
};
pub use crate::emit::{render, Catalog, OutputFormat};
pub use crate::io::{build_source_reader, read_source, reader_from_path, write_artifact, SourceMeta};
pub use crate::reader::{parse_table, split_header, RawRow};
pub use crate::record::{
    map_records, FieldIndex, ProductEntity, RawRecord, SourceField, StockStatus,
};

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of one generation run.
#[derive(Debug)]
pub struct GenerationSummary {
    pub product_count: usize,
    pub output: PathBuf,
    /// CRC32 of the written artifact; equal across runs on unchanged input.
    pub checksum: u32,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("CSV file is empty or malformed: {0}")]
    MalformedInput(String),
    #[error("Missing required header: {0}")]
    MissingHeader(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv_async::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Parses and maps already-decoded table text into a catalog.
pub fn build_catalog(text: &str, config: &GeneratorConfig) -> CatalogResult<Catalog> {
    let (header, rows) = split_header(parse_table(text))?;
    let index = FieldIndex::from_header(&header);

    let missing: Vec<SourceField> = index.missing().collect();
    if let Some(first) = missing.first() {
        if config.input.strict_headers {
            return Err(CatalogError::MissingHeader(first.to_string()));
        }
        for field in &missing {
            warn!(column = %field, "column absent, defaults apply");
        }
    }

    let products = map_records(&index, &rows, &config.defaults);
    debug!(products = products.len(), "records mapped");
    Ok(Catalog::new(products))
}

/// Reads the configured input, builds the catalog and overwrites the output artifact.
pub async fn generate_catalog(config: &GeneratorConfig) -> CatalogResult<GenerationSummary> {
    let input = config.input_path();
    let output = config.output_path();

    let text = read_source(&input, config.charset()?).await?;
    let catalog = build_catalog(&text, config)?;
    let rendered = render(&catalog, config.output.format)?;
    let checksum = write_artifact(&output, &rendered).await?;

    info!(
        products = catalog.len(),
        categories = catalog.categories.len(),
        brands = catalog.brands.len(),
        output = %output.display(),
        crc = %format!("0x{checksum:08x}"),
        "catalog generated"
    );

    Ok(GenerationSummary {
        product_count: catalog.len(),
        output,
        checksum,
    })
}

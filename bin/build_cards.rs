use clap::{Arg, Command};
use dorren_catalog::cards::{build_cards, load_image_cache, read_stock_rows, write_cards};
use dorren_catalog::{default_root, read_source, GeneratorConfig};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dorren_catalog::logging::init();

    let matches = Command::new("build-cards")
        .about("Build product_cards.csv/.json from the warehouse stock sheet")
        .arg(Arg::new("root").long("root").help("Project root; defaults to the crate directory at build time, so pass it when running an installed binary").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("config").long("config").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("sheet").long("sheet").help("Stock sheet CSV (name, stock)").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("image-cache").long("image-cache").help("JSON map of product name to image URLs").value_parser(clap::value_parser!(PathBuf)))
        .get_matches();

    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(default_root);
    let mut config = GeneratorConfig::load(&root, matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if let Some(sheet) = matches.get_one::<PathBuf>("sheet") {
        config.cards.stock_sheet = sheet.clone();
    }
    if let Some(cache) = matches.get_one::<PathBuf>("image-cache") {
        config.cards.image_cache = cache.clone();
    }

    let sheet = config.resolve(&config.cards.stock_sheet);
    let csv_path = config.resolve(&config.cards.cards_csv);
    let json_path = config.resolve(&config.cards.cards_json);

    let text = read_source(&sheet, config.charset()?).await?;
    let rows = read_stock_rows(&text).await?;
    let images = load_image_cache(&config.resolve(&config.cards.image_cache)).await;
    let cards = build_cards(&rows, &images);
    let summary = write_cards(&cards, &csv_path, &json_path).await?;

    println!("Cards generated: {}", summary.card_count);
    println!("Cards with image URL: {}", summary.with_images);
    println!("CSV: {}", csv_path.display());
    println!("JSON: {}", json_path.display());
    Ok(())
}

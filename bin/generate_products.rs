use clap::{Arg, ArgAction, Command};
use dorren_catalog::{default_root, generate_catalog, GeneratorConfig, OutputFormat};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dorren_catalog::logging::init();

    let matches = Command::new("generate-products")
        .about("Regenerate the storefront product module from product_cards.csv")
        .arg(Arg::new("root").long("root").help("Project root; defaults to the crate directory at build time, so pass it when running an installed binary").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("config").long("config").help("Config file (defaults to <root>/catalog.toml when present)").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("input").long("input").help("Product cards CSV").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("output").long("output").help("Generated module path").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("format").long("format").help("ts or json").value_parser(["ts", "json"]))
        .arg(Arg::new("strict-headers").long("strict-headers").help("Fail when a consumed column is missing").action(ArgAction::SetTrue))
        .get_matches();

    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(default_root);
    let mut config = GeneratorConfig::load(&root, matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if let Some(input) = matches.get_one::<PathBuf>("input") {
        config.paths.input = input.clone();
    }
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.paths.output = output.clone();
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.output.format = format.parse::<OutputFormat>()?;
    }
    if matches.get_flag("strict-headers") {
        config.input.strict_headers = true;
    }

    let summary = generate_catalog(&config).await?;
    println!(
        "Generated {} products in {}",
        summary.product_count,
        summary.output.display()
    );
    Ok(())
}

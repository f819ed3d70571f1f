use dorren_catalog::cards::{build_cards, load_image_cache, read_stock_rows, write_cards};
use dorren_catalog::{generate_catalog, search, Cart, GeneratorConfig, StockStatus};
use std::fs;

const STOCK_SHEET: &str = "\u{feff}Остаток на начало месяца,312
\"Доводчик NOTEDO DC-100, серебро\",4
Глазок дв. Аверс 2216/75-135-черный,0

Петля KALE 110мм,2 шт.
";

#[tokio::test]
async fn stock_sheet_feeds_the_generator() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = GeneratorConfig::load(dir.path(), None)?;

    let public = dir.path().join("public");
    fs::create_dir_all(&public)?;
    fs::write(
        public.join("image_cache.json"),
        r#"{"Петля KALE 110мм": {"image_url": "https://img/kale.jpg", "source_url": "https://shop/kale"}}"#,
    )?;

    let sheet = public.join("stock_sheet.csv");
    fs::write(&sheet, STOCK_SHEET)?;
    let text = dorren_catalog::read_source(&sheet, config.charset()?).await?;
    let rows = read_stock_rows(&text).await?;
    assert_eq!(rows.len(), 3);

    let images = load_image_cache(&config.resolve(&config.cards.image_cache)).await;
    let cards = build_cards(&rows, &images);
    let summary = write_cards(
        &cards,
        &config.resolve(&config.cards.cards_csv),
        &config.resolve(&config.cards.cards_json),
    )
    .await?;
    assert_eq!(summary.card_count, 3);
    assert_eq!(summary.with_images, 1);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(public.join("product_cards.json"))?)?;
    assert_eq!(json[0]["brand"], "NOTEDO");
    assert_eq!(json[1]["availability"], "out_of_stock");

    // The cards CSV is the generator's default input.
    let generated = generate_catalog(&config).await?;
    assert_eq!(generated.product_count, 3);

    let text = fs::read_to_string(&generated.output)?;
    assert!(text.contains(r#"name: "Доводчик NOTEDO DC-100, серебро","#));
    assert!(text.contains(r#"category: "Дверные глазки","#));
    assert!(text.contains(r#"image: "https://img/kale.jpg","#));
    assert!(text.contains(r#"slug: "petlya-kale-110mm-3","#));
    Ok(())
}

#[tokio::test]
async fn generated_catalog_drives_search_and_cart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = GeneratorConfig::load(dir.path(), None)?;
    config.output.format = dorren_catalog::OutputFormat::Json;
    config.paths.output = "products.json".into();

    fs::create_dir_all(dir.path().join("public"))?;
    fs::write(
        config.input_path(),
        "id,slug,name,category,brand,stock,availability,image_url,seo_description\n\
         1,zamok-1,Замок Гардиан 10.01,Дверные замки,GUARDIAN,2,in_stock,,\n\
         2,ruchka-2,Ручка Фуаро,Дверные ручки,FUARO,0,out_of_stock,,\n",
    )?;

    let summary = generate_catalog(&config).await?;
    let catalog: dorren_catalog::Catalog = serde_json::from_str(&fs::read_to_string(summary.output)?)?;

    let found = search(&catalog.products, "замок  гардиан");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].status, StockStatus::InStock);

    let mut cart = Cart::new();
    assert!(cart.add(found[0]));
    assert!(cart.add(found[0]));
    assert!(!cart.add(found[0]));
    assert!(!cart.add(&catalog.products[1]));

    let inquiry = cart.submit(&catalog.products);
    assert_eq!(inquiry.total_items, 2);
    assert_eq!(inquiry.lines[0].slug, "zamok-1");
    assert!(cart.is_empty());
    Ok(())
}

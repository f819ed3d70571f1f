//! Product cards built from the warehouse stock sheet.
//!
//! The stock sheet is a header-less export: product name in the first column,
//! quantity on hand in the second. Each kept row becomes a [`ProductCard`]
//! with a detected brand and category, a transliterated slug and SEO copy.
//! The cards are written as `product_cards.csv` (the generator's input) and
//! a JSON twin.

use crate::config::GENERIC_BRAND;
use crate::io::write_artifact;
use crate::record::{collapse_whitespace, StockStatus};
use crate::CatalogResult;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder, StringRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Checked in order, so longer names must come before their prefixes.
pub const KNOWN_BRANDS: &[&str] = &[
    "ASSA ABLOY",
    "DORMAKABA",
    "SECUREMME",
    "ARMADILLO",
    "NOTEDO",
    "VANGER",
    "APECS",
    "ABLOY",
    "DORMA",
    "AVERS",
    "FUARO",
    "PALLADIUM",
    "RENZ",
    "GEZE",
    "CISA",
    "KALE",
    "PUNTO",
    "AJAX",
    "GUARDIAN",
    "PROTECTOR",
    "PHA",
];

/// Name fragment → category; first match wins.
const CATEGORY_RULES: &[(&str, &str)] = &[
    ("доводчик", "Доводчики"),
    ("глазок", "Дверные глазки"),
    ("цилиндр", "Цилиндровые механизмы"),
    ("броненаклад", "Броненакладки"),
    ("ручк", "Дверные ручки"),
    ("замок", "Дверные замки"),
    ("защелк", "Защелки"),
    ("фиксатор", "Фиксаторы"),
    ("петл", "Дверные петли"),
    ("накладк", "Накладки"),
    ("антипан", "Антипаника"),
    ("шпингалет", "Шпингалеты"),
    ("девиатор", "Девиаторы"),
    ("привод", "Приводы двери"),
    ("стопор", "Ограничители"),
];

const FALLBACK_CATEGORY: &str = "Дверная фурнитура";

/// Opening-balance line the accounting export puts among the products.
const SUMMARY_ROW: &str = "остаток на начало месяца";

const TITLE_LIMIT: usize = 70;
const DESCRIPTION_LIMIT: usize = 165;

pub const CARD_COLUMNS: [&str; 12] = [
    "id",
    "slug",
    "name",
    "category",
    "brand",
    "stock",
    "availability",
    "image_url",
    "image_search_url",
    "seo_title",
    "seo_description",
    "keywords",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow {
    pub name: String,
    pub stock: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachedImage {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub source_url: String,
}

pub type ImageCache = HashMap<String, CachedImage>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub id: usize,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    pub availability: StockStatus,
    pub image_url: String,
    pub image_search_url: String,
    pub seo_title: String,
    pub seo_description: String,
    pub keywords: String,
}

impl ProductCard {
    /// Cells in [`CARD_COLUMNS`] order.
    pub fn to_record(&self) -> [String; 12] {
        [
            self.id.to_string(),
            self.slug.clone(),
            self.name.clone(),
            self.category.clone(),
            self.brand.clone(),
            self.stock.to_string(),
            self.availability.to_string(),
            self.image_url.clone(),
            self.image_search_url.clone(),
            self.seo_title.clone(),
            self.seo_description.clone(),
            self.keywords.clone(),
        ]
    }
}

#[derive(Debug)]
pub struct CardsSummary {
    pub card_count: usize,
    pub with_images: usize,
}

/// Reads the stock sheet rows that name a product.
pub async fn read_stock_rows(text: &str) -> CatalogResult<Vec<StockRow>> {
    let mut rdr = AsyncReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .create_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record).await? {
        let name = record.get(0).unwrap_or("").trim();
        if name.is_empty() || name.to_lowercase() == SUMMARY_ROW {
            continue;
        }
        rows.push(StockRow {
            name: name.to_string(),
            stock: record.get(1).unwrap_or("").trim().to_string(),
        });
    }

    debug!(rows = rows.len(), "stock sheet read");
    Ok(rows)
}

/// Builds cards for `rows`. Ids are 1-based row ordinals; a row whose
/// cleaned name is empty is skipped but still consumes its ordinal.
pub fn build_cards(rows: &[StockRow], images: &ImageCache) -> Vec<ProductCard> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let idx = i + 1;
            let name = normalize_name(&row.name);
            if name.is_empty() {
                return None;
            }

            let stock = parse_stock(&row.stock);
            let category = detect_category(&name).to_string();
            let brand = detect_brand(&name);
            let image = images.get(&name).cloned().unwrap_or_default();

            Some(ProductCard {
                id: idx,
                slug: slugify(&name, idx),
                seo_title: seo_title(&name),
                seo_description: seo_description(&name, &category, &brand, stock),
                keywords: build_keywords(&name, &category, &brand),
                availability: if stock > 0 {
                    StockStatus::InStock
                } else {
                    StockStatus::OutOfStock
                },
                image_url: image.image_url,
                image_search_url: image.source_url,
                name,
                category,
                brand,
                stock,
            })
        })
        .collect()
}

/// Loads the name → image cache. A missing or unreadable cache is empty.
pub async fn load_image_cache(path: &Path) -> ImageCache {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), %err, "no image cache");
            return ImageCache::new();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "image cache is not valid JSON, ignoring it");
        ImageCache::new()
    })
}

/// Writes the cards as CSV (header included) and as pretty JSON.
pub async fn write_cards(cards: &[ProductCard], csv_path: &Path, json_path: &Path) -> CatalogResult<CardsSummary> {
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file = tokio::fs::File::create(csv_path).await?;
    let mut wtr = AsyncWriterBuilder::new().create_writer(file);
    wtr.write_record(&CARD_COLUMNS).await?;
    for card in cards {
        wtr.write_record(&card.to_record()).await?;
    }
    wtr.flush().await?;

    let mut json = serde_json::to_string_pretty(cards)?;
    json.push('\n');
    write_artifact(json_path, &json).await?;

    Ok(CardsSummary {
        card_count: cards.len(),
        with_images: cards.iter().filter(|c| !c.image_url.is_empty()).count(),
    })
}

/// Strips wrapping quotes, collapses whitespace and trailing `,; ` punctuation.
pub fn normalize_name(raw: &str) -> String {
    let name = collapse_whitespace(raw.trim().trim_matches('"'));
    name.trim_end_matches(&[',', ';', ' '][..]).to_string()
}

/// Digits and minus signs only; anything unparseable is 0.
pub fn parse_stock(raw: &str) -> i64 {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().unwrap_or(0)
}

fn brand_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\b[A-Z]{3,}\b").expect("brand token pattern is valid"))
}

pub fn detect_brand(name: &str) -> String {
    let upper = name.to_uppercase().replace('Ё', "Е");
    if let Some(brand) = KNOWN_BRANDS.iter().find(|b| upper.contains(**b)) {
        return brand.to_string();
    }
    brand_token()
        .find(&upper)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| GENERIC_BRAND.to_string())
}

pub fn detect_category(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(key, _)| lowered.contains(*key))
        .map(|(_, category)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

fn transliterate(ch: char) -> Option<&'static str> {
    Some(match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    })
}

/// Latin slug with the row ordinal appended, e.g. `glazok-apecs-3016-8`.
pub fn slugify(name: &str, idx: usize) -> String {
    let mut raw = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        match transliterate(ch) {
            Some(latin) => raw.push_str(latin),
            None if ch.is_ascii_lowercase() || ch.is_ascii_digit() => raw.push(ch),
            None => raw.push('-'),
        }
    }

    let slug = raw.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        format!("tovar-{idx}-{idx}")
    } else {
        format!("{slug}-{idx}")
    }
}

/// Shortens to at most `limit` characters, backing off to a word boundary.
pub fn crop(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let trimmed: String = text.chars().take(limit.saturating_sub(1)).collect();
    let head = match trimmed.rfind(' ') {
        Some(pos) => &trimmed[..pos],
        None => trimmed.as_str(),
    };
    format!("{head}…")
}

fn seo_title(name: &str) -> String {
    crop(&format!("{name} купить в наличии | Дорстор"), TITLE_LIMIT)
}

fn seo_description(name: &str, category: &str, brand: &str, stock: i64) -> String {
    let availability = if stock > 0 {
        format!("В наличии {stock} шт.")
    } else {
        "Поставка под заказ, уточняйте срок.".to_string()
    };
    crop(
        &format!(
            "{name} — {} для входных и технических дверей. {availability} Бренд: {brand}. Доставка по РФ и самовывоз.",
            category.to_lowercase()
        ),
        DESCRIPTION_LIMIT,
    )
}

/// Keyword list without case-insensitive duplicates.
pub fn build_keywords(name: &str, category: &str, brand: &str) -> String {
    let brand_phrase = format!("{brand} фурнитура");
    let candidates = [
        name,
        category,
        brand_phrase.as_str(),
        "дверная фурнитура купить",
        "фурнитура для дверей",
    ];

    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty() && seen.insert(item.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

//! Header-driven mapping from raw rows to typed product entities.
//!
//! Every consumed column is a [`SourceField`]; the header is resolved to
//! column positions once and each field then goes through its own coercion.
//! Coercion never fails: unparseable or absent values fall back to a
//! deterministic default, so no record is dropped for a single bad field.

use crate::config::EntityDefaults;
use crate::reader::RawRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability token that marks a product as in stock.
pub const IN_STOCK_TOKEN: &str = "in_stock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    Id,
    Slug,
    Name,
    Category,
    Brand,
    Stock,
    Availability,
    ImageUrl,
    SeoDescription,
}

impl SourceField {
    pub const ALL: [SourceField; 9] = [
        SourceField::Id,
        SourceField::Slug,
        SourceField::Name,
        SourceField::Category,
        SourceField::Brand,
        SourceField::Stock,
        SourceField::Availability,
        SourceField::ImageUrl,
        SourceField::SeoDescription,
    ];

    pub fn column(self) -> &'static str {
        match self {
            SourceField::Id => "id",
            SourceField::Slug => "slug",
            SourceField::Name => "name",
            SourceField::Category => "category",
            SourceField::Brand => "brand",
            SourceField::Stock => "stock",
            SourceField::Availability => "availability",
            SourceField::ImageUrl => "image_url",
            SourceField::SeoDescription => "seo_description",
        }
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Column positions of the consumed fields, resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIndex {
    positions: [Option<usize>; SourceField::ALL.len()],
}

impl FieldIndex {
    /// Header names are trimmed; with duplicate names the rightmost column wins.
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = [None; SourceField::ALL.len()];
        for (slot, field) in positions.iter_mut().zip(SourceField::ALL) {
            *slot = header.iter().rposition(|name| name.trim() == field.column());
        }
        Self { positions }
    }

    pub fn position(&self, field: SourceField) -> Option<usize> {
        self.positions[field as usize]
    }

    pub fn missing(&self) -> impl Iterator<Item = SourceField> + '_ {
        SourceField::ALL
            .into_iter()
            .filter(|field| self.position(*field).is_none())
    }
}

/// One data row viewed through the header.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    index: &'a FieldIndex,
    cells: &'a [String],
}

impl<'a> RawRecord<'a> {
    pub fn new(index: &'a FieldIndex, cells: &'a [String]) -> Self {
        Self { index, cells }
    }

    /// Raw cell text; absent columns and short rows read as "".
    pub fn get(&self, field: SourceField) -> &'a str {
        self.index
            .position(field)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// Only the exact `in_stock` token counts; the numeric stock is not consulted.
    pub fn from_availability(raw: &str) -> Self {
        if raw == IN_STOCK_TOKEN {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntity {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub stock: i64,
    pub status: StockStatus,
    pub image: String,
    pub description: String,
}

impl ProductEntity {
    /// Builds the entity for the data row at `position` (0-based).
    pub fn from_record(record: &RawRecord<'_>, position: usize, defaults: &EntityDefaults) -> Self {
        let ordinal = position as i64 + 1;
        let name = record.get(SourceField::Name).trim().to_string();
        let category = record.get(SourceField::Category).trim().to_string();

        let slug = match record.get(SourceField::Slug).trim() {
            "" => format!("product-{ordinal}"),
            slug => slug.to_string(),
        };
        let brand = match record.get(SourceField::Brand).trim() {
            "" => defaults.brand.clone(),
            brand => brand.to_string(),
        };

        let description = match collapse_whitespace(record.get(SourceField::SeoDescription)) {
            text if text.is_empty() => synthesize_description(&name, &category, defaults),
            text => text,
        };

        Self {
            id: parse_leading_int(record.get(SourceField::Id)).unwrap_or(ordinal),
            slug,
            brand,
            stock: parse_leading_int(record.get(SourceField::Stock)).unwrap_or(0),
            status: StockStatus::from_availability(record.get(SourceField::Availability)),
            image: record.get(SourceField::ImageUrl).trim().to_string(),
            description,
            name,
            category,
        }
    }
}

/// Maps every data row and orders the result by ascending id.
/// The sort is stable: equal ids keep their row order.
pub fn map_records(index: &FieldIndex, rows: &[RawRow], defaults: &EntityDefaults) -> Vec<ProductEntity> {
    let mut products: Vec<ProductEntity> = rows
        .iter()
        .enumerate()
        .map(|(position, cells)| {
            ProductEntity::from_record(&RawRecord::new(index, cells), position, defaults)
        })
        .collect();
    products.sort_by_key(|p| p.id);
    products
}

/// Integer prefix of `raw` after leading whitespace, with an optional sign.
/// `"12 шт"` gives 12; no leading digits gives `None`.
///
/// Digits that overflow `i64` also give `None`, so an oversized id falls back
/// to the row position instead of sorting last.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn synthesize_description(name: &str, category: &str, defaults: &EntityDefaults) -> String {
    let noun = if category.is_empty() {
        defaults.category_noun.clone()
    } else {
        category.to_lowercase()
    };
    format!("{name} — {noun} {}", defaults.description_suffix)
}

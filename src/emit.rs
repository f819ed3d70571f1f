//! Rendering of the catalog into the static data module the storefront imports.

use crate::record::ProductEntity;
use crate::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::str::FromStr;

const PRODUCT_INTERFACE: &str = "export interface Product {
  id: number;
  slug: string;
  name: string;
  category: string;
  brand: string;
  stock: number;
  status: 'in_stock' | 'out_of_stock';
  image: string;
  description: string;
}
";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "ts")]
    TypeScript,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Ok(OutputFormat::TypeScript),
            "json" => Ok(OutputFormat::Json),
            other => Err(CatalogError::Config(format!("unknown output format: {other}"))),
        }
    }
}

/// Sorted products plus the lookup lists derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<ProductEntity>,
    /// Distinct categories in first-seen order.
    pub categories: Vec<String>,
    /// Distinct brands, sorted.
    pub brands: Vec<String>,
}

impl Catalog {
    pub fn new(products: Vec<ProductEntity>) -> Self {
        let mut seen = HashSet::new();
        let categories = products
            .iter()
            .filter(|p| seen.insert(p.category.as_str()))
            .map(|p| p.category.clone())
            .collect();

        let mut brands: Vec<String> = products.iter().map(|p| p.brand.clone()).collect();
        brands.sort();
        brands.dedup();

        Self {
            products,
            categories,
            brands,
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

pub fn render(catalog: &Catalog, format: OutputFormat) -> CatalogResult<String> {
    match format {
        OutputFormat::TypeScript => render_typescript(catalog),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(catalog)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn render_typescript(catalog: &Catalog) -> CatalogResult<String> {
    let mut out = String::with_capacity(256 + catalog.len() * 512);
    out.push_str(PRODUCT_INTERFACE);
    out.push_str("\nexport const products: Product[] = [\n");

    let entries = catalog
        .products
        .iter()
        .map(render_product)
        .collect::<CatalogResult<Vec<_>>>()?;
    out.push_str(&entries.join(",\n"));

    out.push_str("\n];\n\n");
    let _ = writeln!(out, "export const categories: string[] = {};", string_array(&catalog.categories)?);
    let _ = writeln!(out, "export const brands: string[] = {};", string_array(&catalog.brands)?);
    Ok(out)
}

fn render_product(product: &ProductEntity) -> CatalogResult<String> {
    Ok(format!(
        "  {{
    id: {},
    slug: {},
    name: {},
    category: {},
    brand: {},
    stock: {},
    status: '{}',
    image: {},
    description: {}
  }}",
        product.id,
        literal(&product.slug)?,
        literal(&product.name)?,
        literal(&product.category)?,
        literal(&product.brand)?,
        product.stock,
        product.status,
        literal(&product.image)?,
        literal(&product.description)?,
    ))
}

/// JSON string escaping; a JSON string is also a valid TypeScript string literal.
fn literal(value: &str) -> CatalogResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn string_array(values: &[String]) -> CatalogResult<String> {
    let items = values
        .iter()
        .map(|v| literal(v))
        .collect::<CatalogResult<Vec<_>>>()?;
    Ok(format!("[{}]", items.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StockStatus;

    fn product(id: i64, category: &str, brand: &str) -> ProductEntity {
        ProductEntity {
            id,
            slug: format!("p-{id}"),
            name: format!("Product {id}"),
            category: category.into(),
            brand: brand.into(),
            stock: 1,
            status: StockStatus::InStock,
            image: String::new(),
            description: "d".into(),
        }
    }

    #[test]
    fn derived_lists() {
        let catalog = Catalog::new(vec![
            product(1, "Доводчики", "NOTEDO"),
            product(2, "Глазки", "APECS"),
            product(3, "Доводчики", "DORMA"),
            product(4, "Глазки", "APECS"),
            product(5, "Цилиндры", "Универсальный"),
        ]);

        assert_eq!(catalog.categories, vec!["Доводчики", "Глазки", "Цилиндры"]);
        assert_eq!(catalog.brands, vec!["APECS", "DORMA", "NOTEDO", "Универсальный"]);
    }

    #[test]
    fn typescript_layout() {
        let catalog = Catalog::new(vec![product(1, "Locks", "CISA")]);
        let ts = render(&catalog, OutputFormat::TypeScript).unwrap();

        assert!(ts.starts_with("export interface Product {\n  id: number;"));
        assert!(ts.contains(
            "export const products: Product[] = [\n  {\n    id: 1,\n    slug: \"p-1\",\n"
        ));
        assert!(ts.contains("    status: 'in_stock',\n"));
        assert!(ts.contains("    description: \"d\"\n  }\n];\n"));
        assert!(ts.ends_with(
            "export const categories: string[] = [\"Locks\"];\nexport const brands: string[] = [\"CISA\"];\n"
        ));
    }

    #[test]
    fn strings_are_escaped() {
        let mut tricky = product(1, "Locks", "CISA");
        tricky.name = "Замок \"Гардиан\" 10.01\\a\nb".into();
        let ts = render(&Catalog::new(vec![tricky]), OutputFormat::TypeScript).unwrap();

        assert!(ts.contains(r#"    name: "Замок \"Гардиан\" 10.01\\a\nb","#));
    }

    #[test]
    fn json_output_parses_back() {
        let catalog = Catalog::new(vec![product(2, "Locks", "CISA"), product(3, "Hinges", "KALE")]);
        let json = render(&catalog, OutputFormat::Json).unwrap();

        let parsed: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
        assert!(json.contains("\"status\": \"in_stock\""));
    }

    #[test]
    fn format_names() {
        assert_eq!("ts".parse::<OutputFormat>().unwrap(), OutputFormat::TypeScript);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}

//! Search and filtering over the generated product list, as the storefront applies them.

use crate::record::{ProductEntity, StockStatus};

/// Lowercase, `ё` folded to `е`, whitespace collapsed.
pub fn normalize_search_text(value: &str) -> String {
    value
        .to_lowercase()
        .replace('ё', "е")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn haystack(product: &ProductEntity) -> String {
    normalize_search_text(&format!(
        "{} {} {} {} {}",
        product.name, product.brand, product.category, product.slug, product.description
    ))
}

/// Products whose text contains every query token. A blank query matches everything.
pub fn search<'a>(products: &'a [ProductEntity], query: &str) -> Vec<&'a ProductEntity> {
    let query = normalize_search_text(query);
    if query.is_empty() {
        return products.iter().collect();
    }

    let tokens: Vec<&str> = query.split(' ').collect();
    products
        .iter()
        .filter(|p| {
            let text = haystack(p);
            tokens.iter().all(|token| text.contains(*token))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    OutOfStock,
}

impl StockFilter {
    pub fn matches(self, status: StockStatus) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::InStock => status == StockStatus::InStock,
            StockFilter::OutOfStock => status == StockStatus::OutOfStock,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// An empty name selects no category, same as `None`.
    pub category: Option<String>,
    /// Any of these; empty means every brand.
    pub brands: Vec<String>,
    pub stock: StockFilter,
}

impl CatalogFilter {
    fn selected_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn matches(&self, product: &ProductEntity) -> bool {
        if self.selected_category().is_some_and(|c| c != product.category) {
            return false;
        }
        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }
        self.stock.matches(product.status)
    }

    pub fn apply<'a, I>(&self, products: I) -> Vec<&'a ProductEntity>
    where
        I: IntoIterator<Item = &'a ProductEntity>,
    {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }

    pub fn toggle_brand(&mut self, brand: &str) {
        match self.brands.iter().position(|b| b == brand) {
            Some(i) => {
                self.brands.remove(i);
            }
            None => self.brands.push(brand.to_string()),
        }
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.selected_category().is_some())
            + self.brands.len()
            + usize::from(self.stock != StockFilter::All)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Product count per category, in the order of `categories`.
pub fn category_counts<'a>(
    categories: &'a [String],
    products: &[&ProductEntity],
) -> Vec<(&'a str, usize)> {
    categories
        .iter()
        .map(|c| {
            let count = products.iter().filter(|p| p.category == *c).count();
            (c.as_str(), count)
        })
        .collect()
}

pub fn find_by_slug<'a>(products: &'a [ProductEntity], slug: &str) -> Option<&'a ProductEntity> {
    products.iter().find(|p| p.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, category: &str, brand: &str, status: StockStatus) -> ProductEntity {
        ProductEntity {
            id,
            slug: format!("item-{id}"),
            name: name.into(),
            category: category.into(),
            brand: brand.into(),
            stock: 3,
            status,
            image: String::new(),
            description: format!("{name} для дверей"),
        }
    }

    fn sample() -> Vec<ProductEntity> {
        vec![
            product(1, "Доводчик NOTEDO DC-100", "Доводчики", "NOTEDO", StockStatus::InStock),
            product(2, "Глазок APECS 3016 Чёрный", "Дверные глазки", "APECS", StockStatus::OutOfStock),
            product(3, "Доводчик DORMA TS-77", "Доводчики", "DORMA", StockStatus::InStock),
        ]
    }

    #[test]
    fn normalization_folds_yo_and_spaces() {
        assert_eq!(normalize_search_text("  Чёрный\t ГЛАЗОК \n"), "черный глазок");
    }

    #[test]
    fn search_requires_every_token() {
        let products = sample();
        let ids = |found: Vec<&ProductEntity>| found.iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(search(&products, "доводчик")), vec![1, 3]);
        assert_eq!(ids(search(&products, "доводчик  dorma")), vec![3]);
        assert_eq!(ids(search(&products, "черный")), vec![2]);
        assert_eq!(ids(search(&products, "item-2")), vec![2]);
        assert_eq!(ids(search(&products, "   ")), vec![1, 2, 3]);
        assert!(search(&products, "петля").is_empty());
    }

    #[test]
    fn filters_combine() {
        let products = sample();
        let mut filter = CatalogFilter {
            category: Some("Доводчики".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&products).len(), 2);

        filter.toggle_brand("DORMA");
        let found = filter.apply(&products);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);
        assert_eq!(filter.active_count(), 2);

        filter.toggle_brand("DORMA");
        filter.category = None;
        filter.stock = StockFilter::OutOfStock;
        let found = filter.apply(&products);
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);

        filter.clear();
        assert_eq!(filter.active_count(), 0);
        assert_eq!(filter.apply(&products).len(), 3);
    }

    #[test]
    fn empty_category_selects_everything() {
        let products = sample();
        let filter = CatalogFilter {
            category: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&products).len(), 3);
        assert_eq!(filter.active_count(), 0);
    }

    #[test]
    fn counts_follow_category_order() {
        let products = sample();
        let categories = vec!["Доводчики".to_string(), "Дверные глазки".to_string(), "Петли".to_string()];
        let visible = search(&products, "");

        assert_eq!(
            category_counts(&categories, &visible),
            vec![("Доводчики", 2), ("Дверные глазки", 1), ("Петли", 0)]
        );
    }

    #[test]
    fn slug_lookup() {
        let products = sample();
        assert_eq!(find_by_slug(&products, "item-3").map(|p| p.id), Some(3));
        assert!(find_by_slug(&products, "item-9").is_none());
    }
}

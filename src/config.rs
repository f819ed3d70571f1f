use crate::emit::OutputFormat;
use crate::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the project root when no explicit config file is given.
pub const CONFIG_FILE_NAME: &str = "catalog.toml";

pub const DEFAULT_INPUT: &str = "public/product_cards.csv";
pub const DEFAULT_OUTPUT: &str = "src/data/products.ts";

/// Brand label used when the source omits one.
pub const GENERIC_BRAND: &str = "Универсальный";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Project root every relative path resolves against. Not read from the file.
    #[serde(skip)]
    pub root: PathBuf,
    pub paths: PathsConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub defaults: EntityDefaults,
    pub cards: CardsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.into(),
            output: DEFAULT_OUTPUT.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Any WHATWG encoding label, e.g. "utf-8" or "windows-1251".
    pub charset: String,
    /// Fail instead of defaulting when a consumed column is absent.
    pub strict_headers: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            charset: "utf-8".into(),
            strict_headers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Fallback values applied while mapping records.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntityDefaults {
    pub brand: String,
    /// Stands in for the category in a synthesized description.
    pub category_noun: String,
    pub description_suffix: String,
}

impl Default for EntityDefaults {
    fn default() -> Self {
        Self {
            brand: GENERIC_BRAND.into(),
            category_noun: "дверная фурнитура".into(),
            description_suffix: "для входных и технических дверей.".into(),
        }
    }
}

/// Locations used by the product card builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub stock_sheet: PathBuf,
    pub cards_csv: PathBuf,
    pub cards_json: PathBuf,
    pub image_cache: PathBuf,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            stock_sheet: "public/stock_sheet.csv".into(),
            cards_csv: DEFAULT_INPUT.into(),
            cards_json: "public/product_cards.json".into(),
            image_cache: "public/image_cache.json".into(),
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration for `root`.
    ///
    /// Search order:
    /// 1. `explicit`, which must exist
    /// 2. `catalog.toml` in the project root
    /// 3. built-in defaults
    pub fn load(root: &Path, explicit: Option<&Path>) -> CatalogResult<Self> {
        let candidate = match explicit {
            Some(path) => Some(resolve(root, path)),
            None => Some(root.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
        };

        let mut config = match candidate {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                let contents = std::fs::read_to_string(&path)?;
                Self::from_toml(&contents)?
            }
            None => {
                tracing::debug!("Using default configuration");
                Self::default()
            }
        };
        config.root = root.to_path_buf();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> CatalogResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn input_path(&self) -> PathBuf {
        resolve(&self.root, &self.paths.input)
    }

    pub fn output_path(&self) -> PathBuf {
        resolve(&self.root, &self.paths.output)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve(&self.root, path)
    }

    pub fn charset(&self) -> CatalogResult<&'static encoding_rs::Encoding> {
        encoding_rs::Encoding::for_label(self.input.charset.trim().as_bytes()).ok_or_else(|| {
            CatalogError::Config(format!("unknown input charset: {}", self.input.charset))
        })
    }
}

/// The crate's own directory; the generator runs from inside the storefront project.
/// The path is fixed at build time, so an installed binary needs `--root`.
pub fn default_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GeneratorConfig::from_toml("").unwrap();
        assert_eq!(config.paths.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.paths.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.defaults.brand, GENERIC_BRAND);
        assert_eq!(config.output.format, OutputFormat::TypeScript);
        assert!(!config.input.strict_headers);
    }

    #[test]
    fn partial_sections_override_only_named_keys() {
        let config = GeneratorConfig::from_toml(
            r#"
            [paths]
            output = "out/products.json"

            [output]
            format = "json"

            [defaults]
            brand = "No name"
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.paths.output, PathBuf::from("out/products.json"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.defaults.brand, "No name");
        assert_eq!(config.defaults.category_noun, "дверная фурнитура");
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let mut config = GeneratorConfig::default();
        config.root = PathBuf::from("/srv/storefront");
        assert_eq!(
            config.input_path(),
            PathBuf::from("/srv/storefront/public/product_cards.csv")
        );

        config.paths.output = PathBuf::from("/tmp/products.ts");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/products.ts"));
    }

    #[test]
    fn charset_labels() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.charset().unwrap(), encoding_rs::UTF_8);

        config.input.charset = "cp1251".into();
        assert_eq!(config.charset().unwrap(), encoding_rs::WINDOWS_1251);

        config.input.charset = "klingon".into();
        assert!(matches!(config.charset(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn load_falls_back_without_file_and_rejects_missing_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.root, dir.path());

        let err = GeneratorConfig::load(dir.path(), Some(Path::new("missing.toml"))).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}

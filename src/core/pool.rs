use crate::core::config::CategoriesConfig;
use rand::Rng;

/// Upper bound (inclusive) of the raw index drawn at each selection site.
pub const MAX_RAW_INDEX: u64 = 500;

#[derive(Debug)]
pub enum PoolError {
    EmptyCategory { name: &'static str },
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::EmptyCategory { name } => write!(f, "category `{name}` has no values"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Non-empty, immutable list of values for one category.
#[derive(Debug, Clone)]
pub struct Category<T> {
    values: Vec<T>,
}

impl<T> Category<T> {
    pub fn new(name: &'static str, values: Vec<T>) -> Result<Self, PoolError> {
        if values.is_empty() {
            return Err(PoolError::EmptyCategory { name });
        }
        Ok(Self { values })
    }

    /// Returns the value at `raw mod len`.
    pub fn pick(&self, raw: u64) -> &T {
        &self.values[self.position(raw)]
    }

    /// Position selected by `raw`, always in `[0, len)`.
    pub fn position(&self, raw: u64) -> usize {
        (raw % self.values.len() as u64) as usize
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// Fixed vocabularies shared read-only by every generator.
#[derive(Debug, Clone)]
pub struct CategoryPool {
    pub users: Category<String>,
    pub paths: Category<String>,
    pub status_codes: Category<u16>,
    pub errors: Category<String>,
    pub services: Category<String>,
}

impl CategoryPool {
    /// Builds the pool, replacing defaults with any configured overrides.
    pub fn from_config(config: &CategoriesConfig) -> Result<Self, PoolError> {
        Ok(Self {
            users: Category::new("users", strings_or(&config.users, DEFAULT_USERS))?,
            paths: Category::new("paths", strings_or(&config.paths, DEFAULT_PATHS))?,
            status_codes: Category::new(
                "status_codes",
                config
                    .status_codes
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STATUS_CODES.to_vec()),
            )?,
            errors: Category::new("errors", strings_or(&config.errors, DEFAULT_ERRORS))?,
            services: Category::new("services", strings_or(&config.services, DEFAULT_SERVICES))?,
        })
    }
}

impl Default for CategoryPool {
    fn default() -> Self {
        Self {
            users: Category { values: to_strings(DEFAULT_USERS) },
            paths: Category { values: to_strings(DEFAULT_PATHS) },
            status_codes: Category { values: DEFAULT_STATUS_CODES.to_vec() },
            errors: Category { values: to_strings(DEFAULT_ERRORS) },
            services: Category { values: to_strings(DEFAULT_SERVICES) },
        }
    }
}

/// Draws a fresh raw index for one selection site.
pub fn draw_raw_index(rng: &mut impl Rng) -> u64 {
    rng.gen_range(1..=MAX_RAW_INDEX)
}

const DEFAULT_USERS: &[&str] = &["bob", "peter", "john", "alex", "tom"];
const DEFAULT_PATHS: &[&str] = &["/", "/login", "/api/v1"];
const DEFAULT_STATUS_CODES: &[u16] = &[200, 404, 500];
const DEFAULT_ERRORS: &[&str] = &["out of memory", "cpu throttled", "circuit break"];
const DEFAULT_SERVICES: &[&str] = &["frontend", "signup", "accounting", "api"];

fn strings_or(configured: &Option<Vec<String>>, fallback: &[&str]) -> Vec<String> {
    match configured {
        Some(values) => values.clone(),
        None => to_strings(fallback),
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

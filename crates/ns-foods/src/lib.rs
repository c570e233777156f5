//! Open Food Facts client.
//!
//! Looks up packaged foods by barcode and by free-text search. Only the
//! product name and per-100g nutriments are requested; everything else in
//! the response is ignored.

use std::time::Duration;

use ns_core::Per100g;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
const USER_AGENT: &str = concat!("nutriscan/", env!("CARGO_PKG_VERSION"), " (ns-foods)");
const PRODUCT_FIELDS: &str = "product_name,nutriments";
const DEFAULT_PAGE_SIZE: u32 = 20;
/// Shorter queries return nothing without hitting the network.
pub const MIN_QUERY_LEN: usize = 3;

/// Food database errors.
#[derive(Debug, Error)]
pub enum FoodsError {
    /// The barcode contained something other than digits.
    #[error("invalid barcode: {0:?}")]
    InvalidBarcode(String),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status}")]
    Status { status: reqwest::StatusCode },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A product with its per-100g nutrient values.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Display name. Barcode lookups may return products without one.
    pub name: Option<String>,
    pub nutriments: Per100g,
}

/// Open Food Facts API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl Client {
    /// Creates a client against `base_url` (e.g. [`DEFAULT_BASE_URL`]).
    pub fn new(base_url: impl Into<String>) -> Result<Self, FoodsError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FoodsError::ClientBuild)?;
        Ok(Self {
            http,
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Sets the maximum number of search results requested.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Looks up a product by barcode.
    ///
    /// Returns `Ok(None)` when the database does not know the code.
    pub async fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, FoodsError> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FoodsError::InvalidBarcode(barcode.to_string()));
        }

        let url = format!("{}/api/v0/product/{barcode}.json", self.base_url);
        tracing::debug!(%url, "looking up barcode");
        let response = self
            .http
            .get(&url)
            .query(&[("fields", PRODUCT_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FoodsError::Status { status });
        }
        let body = response.text().await?;
        parse_product_response(&body)
    }

    /// Searches products by name.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] characters return no results.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, FoodsError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/cgi/search.pl", self.base_url);
        let page_size = self.page_size.to_string();
        tracing::debug!(%url, query, "searching products");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
                ("fields", PRODUCT_FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FoodsError::Status { status });
        }
        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_name: Option<String>,
    nutriments: Option<RawNutriments>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_number")]
    energy_kcal_100g: Option<f64>,
    #[serde(rename = "proteins_100g", default, deserialize_with = "lenient_number")]
    proteins_100g: Option<f64>,
    #[serde(rename = "fat_100g", default, deserialize_with = "lenient_number")]
    fat_100g: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default, deserialize_with = "lenient_number")]
    carbohydrates_100g: Option<f64>,
}

impl From<RawNutriments> for Per100g {
    fn from(raw: RawNutriments) -> Self {
        Self {
            calories: raw.energy_kcal_100g,
            protein: raw.proteins_100g,
            fat: raw.fat_100g,
            carbs: raw.carbohydrates_100g,
        }
    }
}

/// Open Food Facts sometimes encodes numbers as strings.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn non_blank(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Parses a barcode lookup body. `status != 1` means "not found".
fn parse_product_response(body: &str) -> Result<Option<Product>, FoodsError> {
    let response: ProductResponse =
        serde_json::from_str(body).map_err(|err| FoodsError::InvalidResponse(err.to_string()))?;
    if response.status != 1 {
        return Ok(None);
    }
    Ok(response.product.map(|raw| Product {
        name: non_blank(raw.product_name),
        nutriments: raw.nutriments.unwrap_or_default().into(),
    }))
}

/// Parses a search body, dropping products without a name or nutriments.
fn parse_search_response(body: &str) -> Result<Vec<Product>, FoodsError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|err| FoodsError::InvalidResponse(err.to_string()))?;
    Ok(response
        .products
        .into_iter()
        .filter_map(|raw| {
            let name = non_blank(raw.product_name)?;
            let nutriments = raw.nutriments?;
            Some(Product {
                name: Some(name),
                nutriments: nutriments.into(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_found_product() {
        let body = r#"{
            "code": "3017620422003",
            "status": 1,
            "status_verbose": "product found",
            "product": {
                "product_name": "Nutella",
                "nutriments": {
                    "energy-kcal_100g": 539,
                    "proteins_100g": 6.3,
                    "fat_100g": 30.9,
                    "carbohydrates_100g": 57.5,
                    "sugars_100g": 56.3
                }
            }
        }"#;
        let product = parse_product_response(body).unwrap().unwrap();
        assert_eq!(product.name.as_deref(), Some("Nutella"));
        assert_eq!(product.nutriments.calories, Some(539.0));
        assert_eq!(product.nutriments.protein, Some(6.3));
        assert_eq!(product.nutriments.fat, Some(30.9));
        assert_eq!(product.nutriments.carbs, Some(57.5));
    }

    #[test]
    fn status_zero_is_not_found() {
        let body = r#"{"code":"0000","status":0,"status_verbose":"product not found"}"#;
        assert_eq!(parse_product_response(body).unwrap(), None);
    }

    #[test]
    fn product_without_name_or_nutriments_is_still_returned() {
        let body = r#"{"status":1,"product":{"product_name":"  "}}"#;
        let product = parse_product_response(body).unwrap().unwrap();
        assert_eq!(product.name, None);
        assert_eq!(product.nutriments, Per100g::default());
    }

    #[test]
    fn string_encoded_nutriments_are_accepted() {
        let body = r#"{"status":1,"product":{"product_name":"Milk","nutriments":{
            "energy-kcal_100g":"64","proteins_100g":"3.3","fat_100g":"not a number"}}}"#;
        let product = parse_product_response(body).unwrap().unwrap();
        assert_eq!(product.nutriments.calories, Some(64.0));
        assert_eq!(product.nutriments.protein, Some(3.3));
        assert_eq!(product.nutriments.fat, None);
        assert_eq!(product.nutriments.carbs, None);
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        let err = parse_product_response("<html>").unwrap_err();
        assert!(matches!(err, FoodsError::InvalidResponse(_)));
    }

    #[test]
    fn search_filters_incomplete_products() {
        let body = r#"{
            "count": 4,
            "page_size": 20,
            "products": [
                {"product_name": "Greek yogurt", "nutriments": {"energy-kcal_100g": 97}},
                {"product_name": "", "nutriments": {"energy-kcal_100g": 50}},
                {"nutriments": {"energy-kcal_100g": 50}},
                {"product_name": "Mystery bar"}
            ]
        }"#;
        let products = parse_search_response(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name.as_deref(), Some("Greek yogurt"));
        assert_eq!(products[0].nutriments.calories, Some(97.0));
    }

    #[test]
    fn search_without_products_is_empty() {
        assert!(parse_search_response(r#"{"count":0}"#).unwrap().is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::new("https://example.org/").unwrap();
        assert_eq!(client.base_url, "https://example.org");
    }

    #[tokio::test]
    async fn short_query_skips_request() {
        // Unroutable base URL: any request would fail.
        let client = Client::new("http://127.0.0.1:9").unwrap();
        assert!(client.search("ab").await.unwrap().is_empty());
        assert!(client.search("  a  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_barcode_is_rejected() {
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let err = client.product_by_barcode("12ab").await.unwrap_err();
        assert!(matches!(err, FoodsError::InvalidBarcode(_)));
        assert!(matches!(
            client.product_by_barcode("  ").await,
            Err(FoodsError::InvalidBarcode(_))
        ));
    }
}

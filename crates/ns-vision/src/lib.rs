//! Food photo analysis with the Gemini API.
//!
//! Sends a photo with a prompt asking for strict JSON nutrient estimates per
//! 100 g, and parses the reply into a [`FoodGuess`].

use std::fmt;
use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ns_core::Per100g;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Name the model is asked to return for images that show no food.
pub const UNKNOWN_FOOD: &str = "Unknown";

const ANALYSIS_PROMPT: &str = "\
Analyze this food photo and identify the main food item.
Return ONLY a JSON object with exactly this structure (no Markdown, no backticks):
{
  \"foodName\": \"name of the dish\",
  \"calories100g\": approximate integer kcal per 100 g,
  \"protein100g\": decimal grams of protein per 100 g,
  \"fat100g\": decimal grams of fat per 100 g,
  \"carbs100g\": decimal grams of carbohydrates per 100 g
}
If the image does not show food, use 0 for every value and the name \"Unknown\".";

/// Vision client errors.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The model's estimate for a photographed food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodGuess {
    pub name: String,
    pub per_100g: Per100g,
}

impl FoodGuess {
    /// Whether the model reported that the image shows no food.
    pub fn is_unknown(&self) -> bool {
        self.name.eq_ignore_ascii_case(UNKNOWN_FOOD)
            || self.name.eq_ignore_ascii_case("desconocido")
    }
}

/// Gemini API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, VisionError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(VisionError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(VisionError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(VisionError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Uses `model` instead of [`DEFAULT_MODEL`].
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Asks the model to identify the food in `image` and estimate its
    /// nutrients per 100 g.
    pub async fn analyze_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<FoodGuess, VisionError> {
        let request = build_request(image, mime_type);
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        tracing::debug!(model = %self.model, bytes = image.len(), mime_type, "analyzing image");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| VisionError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: GenerateResponse = serde_json::from_str(&body)
            .map_err(|err| VisionError::InvalidResponse(err.to_string()))?;
        let text = extract_text(payload)?;
        parse_food_guess(&text)
    }
}

/// MIME type for a photo, from its file extension.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: &'static str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

fn build_request(image: &[u8], mime_type: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: STANDARD.encode(image),
                    },
                },
                Part::Text {
                    text: ANALYSIS_PROMPT,
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn extract_text(response: GenerateResponse) -> Result<String, VisionError> {
    let text: Vec<String> = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(VisionError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(text.concat())
}

fn parse_api_error(body: &str) -> Option<VisionError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| VisionError::Api {
            message: payload.error.message,
        })
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_food_guess(text: &str) -> Result<FoodGuess, VisionError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        food_name: String,
        #[serde(rename = "calories100g", default)]
        calories_100g: Option<f64>,
        #[serde(rename = "protein100g", default)]
        protein_100g: Option<f64>,
        #[serde(rename = "fat100g", default)]
        fat_100g: Option<f64>,
        #[serde(rename = "carbs100g", default)]
        carbs_100g: Option<f64>,
    }

    let payload: Payload = serde_json::from_str(strip_code_fences(text))
        .map_err(|err| VisionError::InvalidResponse(err.to_string()))?;
    Ok(FoodGuess {
        name: payload.food_name.trim().to_string(),
        per_100g: Per100g {
            calories: payload.calories_100g,
            protein: payload.protein_100g,
            fat: payload.fat_100g,
            carbs: payload.carbs_100g,
        },
    })
}

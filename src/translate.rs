//! Translation dispatch.
//!
//! Requests are tagged variants so each payload shape maps deterministically
//! to its own decoder. The dispatcher talks either to the generative-language
//! endpoint directly (API key as a query parameter) or to a server-side proxy
//! that hides the key. Failures surface as error strings for the result pane;
//! nothing is retried automatically.

use crate::sanitize::sanitize_text;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Substituted when the endpoint answers without any candidate text.
pub const NO_TRANSLATION_FALLBACK: &str = "No translation found.";

/// A normalized span ready for dispatch, tagged with the requested shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationRequest {
    /// Single fluent translation of the whole span.
    FreeText { text: String, target_language: String },
    /// Per-word dictionary breakdown of the span.
    Dictionary { text: String, target_language: String },
}

impl TranslationRequest {
    pub fn text(&self) -> &str {
        match self {
            Self::FreeText { text, .. } | Self::Dictionary { text, .. } => text,
        }
    }

    pub fn target_language(&self) -> &str {
        match self {
            Self::FreeText {
                target_language, ..
            }
            | Self::Dictionary {
                target_language, ..
            } => target_language,
        }
    }

    /// The natural-language instruction sent to the model.
    pub fn prompt(&self) -> String {
        match self {
            Self::FreeText {
                text,
                target_language,
            } => format!(
                "Translate the following text into natural and fluent {target_language}. \
                 Maintain the original context and tone. Provide only the translated text \
                 without any additional explanations or labels. \
                 Text to translate: \"{text}\"\n\n{target_language} Translation:"
            ),
            Self::Dictionary {
                text,
                target_language,
            } => format!(
                "You are a helpful bilingual dictionary assistant. Given the following \
                 English text, extract each distinct word (ignore punctuation) and for each \
                 word provide: the original word, probable part of speech (short), and a \
                 concise dictionary-style translation/definition in {target_language}. Also \
                 include a short example sentence in {target_language} if applicable. Return \
                 the complete result as valid JSON: an array of objects with keys \"word\", \
                 \"pos\", \"translation\", and optionally \"example\". \
                 Text: \"{text}\"\n\nRespond with only the JSON array, no additional commentary."
            ),
        }
    }
}

/// One row of a per-word dictionary breakdown.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
    #[serde(alias = "WORD")]
    pub word: String,
    #[serde(default)]
    pub pos: String,
    #[serde(alias = "meaning", default)]
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Decoded model output for the result pane.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    Text(String),
    Dictionary {
        entries: Vec<DictionaryEntry>,
        /// Unparsed model output, kept for the history log.
        raw: String,
    },
}

impl TranslationOutcome {
    /// The string recorded into the history log.
    pub fn logged_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Dictionary { raw, .. } => raw,
        }
    }

    /// Sanitize every string that may reach a pane or the history log.
    pub fn sanitized(self) -> Self {
        match self {
            Self::Text(text) => Self::Text(sanitize_text(&text)),
            Self::Dictionary { entries, raw } => Self::Dictionary {
                entries: entries
                    .into_iter()
                    .map(|e| DictionaryEntry {
                        word: sanitize_text(&e.word),
                        pos: sanitize_text(&e.pos),
                        translation: sanitize_text(&e.translation),
                        example: e.example.map(|x| sanitize_text(&x)),
                    })
                    .collect(),
                raw: sanitize_text(&raw),
            },
        }
    }
}

/// Tolerant decoder for dictionary mode: slice between the first `[` and the
/// last `]` so commentary around the array is ignored, and fall back to the
/// raw model text when parsing still fails.
pub fn decode_dictionary(raw: String) -> TranslationOutcome {
    let parsed = {
        let sliced = match (raw.find('['), raw.rfind(']')) {
            (Some(first), Some(last)) if first < last => &raw[first..=last],
            _ => raw.as_str(),
        };
        serde_json::from_str::<Vec<DictionaryEntry>>(sliced).ok()
    };
    match parsed {
        Some(entries) => {
            debug!(words = entries.len(), "Parsed dictionary response");
            TranslationOutcome::Dictionary { entries, raw }
        }
        None => {
            warn!("Dictionary response was not valid JSON; showing raw text");
            TranslationOutcome::Text(raw)
        }
    }
}

/// Where translation requests are sent.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Generative-language endpoint called directly with an API key.
    Direct {
        base_url: String,
        api_key: Option<String>,
    },
    /// Server-side proxy holding the key; takes the raw text and language.
    Proxy { url: String },
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<GenerateContent>,
}

impl GenerateRequest {
    fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![GenerateContent {
                parts: vec![GeneratePart { text: prompt }],
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct GenerateContent {
    parts: Vec<GeneratePart>,
}

#[derive(Serialize, Deserialize)]
struct GeneratePart {
    text: String,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
}

#[derive(Deserialize)]
struct GenerateCandidate {
    content: GenerateContent,
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    #[serde(rename = "textToTranslate")]
    text_to_translate: &'a str,
    #[serde(rename = "targetLanguage")]
    target_language: &'a str,
}

#[derive(Deserialize)]
struct ProxyResponse {
    translation: Option<String>,
    error: Option<String>,
}

/// Blocking HTTP dispatcher for translation requests.
pub struct Translator {
    http: reqwest::blocking::Client,
    endpoint: Endpoint,
}

impl Translator {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self { http, endpoint })
    }

    /// Issue a request and decode the response according to its variant.
    /// Errors carry a user-visible message for the result pane.
    pub fn translate(&self, request: &TranslationRequest) -> Result<TranslationOutcome> {
        info!(
            target_language = request.target_language(),
            chars = request.text().chars().count(),
            "Dispatching translation"
        );
        let raw = match &self.endpoint {
            Endpoint::Direct { base_url, api_key } => {
                self.call_direct(base_url, api_key.as_deref(), request)?
            }
            Endpoint::Proxy { url } => self.call_proxy(url, request)?,
        };
        Ok(match request {
            TranslationRequest::FreeText { .. } => TranslationOutcome::Text(raw),
            TranslationRequest::Dictionary { .. } => decode_dictionary(raw),
        })
    }

    fn call_direct(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        request: &TranslationRequest,
    ) -> Result<String> {
        let key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!(
                "API key is missing. Set it in conf/config.toml or the GOOGLE_AI_API_KEY environment variable."
            ))?;
        let response = self
            .http
            .post(base_url)
            .query(&[("key", key)])
            .json(&GenerateRequest::from_prompt(request.prompt()))
            .send()
            .context("Translation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .map(|detail| detail.message)
                .unwrap_or_else(|| format!("API request failed with status {status}"));
            return Err(anyhow!(message));
        }

        let data: GenerateResponse = response
            .json()
            .context("Malformed translation response body")?;
        Ok(first_candidate_text(data))
    }

    fn call_proxy(&self, url: &str, request: &TranslationRequest) -> Result<String> {
        let response = self
            .http
            .post(url)
            .json(&ProxyRequest {
                text_to_translate: request.text(),
                target_language: request.target_language(),
            })
            .send()
            .context("Translation request failed")?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProxyResponse>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("API request failed with status {status}"));
            return Err(anyhow!(message));
        }

        let body: ProxyResponse = response
            .json()
            .context("Malformed translation response body")?;
        if let Some(error) = body.error {
            return Err(anyhow!(error));
        }
        Ok(body
            .translation
            .unwrap_or_else(|| NO_TRANSLATION_FALLBACK.to_string()))
    }
}

fn first_candidate_text(data: GenerateResponse) -> String {
    data.candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .unwrap_or_else(|| NO_TRANSLATION_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary_request() -> TranslationRequest {
        TranslationRequest::Dictionary {
            text: "good morning".to_string(),
            target_language: "French".to_string(),
        }
    }

    #[test]
    fn prompts_embed_text_and_target_language() {
        let request = TranslationRequest::FreeText {
            text: "hello there".to_string(),
            target_language: "Italian".to_string(),
        };
        let prompt = request.prompt();
        assert!(prompt.contains("hello there"));
        assert!(prompt.contains("Italian"));

        let dict = dictionary_request().prompt();
        assert!(dict.contains("JSON"));
        assert!(dict.contains("French"));
    }

    #[test]
    fn dictionary_decoder_tolerates_surrounding_commentary() {
        let raw = concat!(
            "Sure! Here is the breakdown you asked for:\n",
            r#"[{"word":"good","pos":"adj.","translation":"bon"},"#,
            r#"{"word":"morning","pos":"n.","translation":"matin","example":"Bon matin!"}]"#,
            "\nLet me know if you need anything else."
        );
        match decode_dictionary(raw.to_string()) {
            TranslationOutcome::Dictionary { entries, .. } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].word, "good");
                assert_eq!(entries[1].example.as_deref(), Some("Bon matin!"));
            }
            other => panic!("expected a parsed dictionary, got {other:?}"),
        }
    }

    #[test]
    fn dictionary_decoder_accepts_legacy_field_names() {
        let raw = r#"[{"WORD":"sun","meaning":"soleil"}]"#;
        match decode_dictionary(raw.to_string()) {
            TranslationOutcome::Dictionary { entries, .. } => {
                assert_eq!(entries[0].word, "sun");
                assert_eq!(entries[0].translation, "soleil");
                assert!(entries[0].pos.is_empty());
            }
            other => panic!("expected a parsed dictionary, got {other:?}"),
        }
    }

    #[test]
    fn malformed_dictionary_json_falls_back_to_raw_text() {
        let raw = "The model refused to emit [valid JSON here".to_string();
        match decode_dictionary(raw.clone()) {
            TranslationOutcome::Text(text) => assert_eq!(text, raw),
            other => panic!("expected raw-text fallback, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidate_list_yields_the_fallback_message() {
        let text = first_candidate_text(GenerateResponse::default());
        assert_eq!(text, NO_TRANSLATION_FALLBACK);
    }

    #[test]
    fn logged_text_uses_raw_model_output_for_dictionaries() {
        let raw = r#"[{"word":"a","translation":"un"}]"#.to_string();
        let outcome = decode_dictionary(raw.clone());
        assert_eq!(outcome.logged_text(), raw);
    }

    #[test]
    fn sanitized_outcome_escapes_markup_in_every_field() {
        let outcome = TranslationOutcome::Dictionary {
            entries: vec![DictionaryEntry {
                word: "<b>bold</b>".to_string(),
                pos: String::new(),
                translation: "a & b".to_string(),
                example: Some("<i>x</i>".to_string()),
            }],
            raw: "<raw>".to_string(),
        };
        match outcome.sanitized() {
            TranslationOutcome::Dictionary { entries, raw } => {
                assert_eq!(entries[0].word, "&lt;b&gt;bold&lt;/b&gt;");
                assert_eq!(entries[0].translation, "a &amp; b");
                assert_eq!(entries[0].example.as_deref(), Some("&lt;i&gt;x&lt;/i&gt;"));
                assert_eq!(raw, "&lt;raw&gt;");
            }
            other => panic!("variant must be preserved, got {other:?}"),
        }
    }

    #[test]
    fn missing_api_key_fails_before_any_network_call() {
        let translator = Translator::new(Endpoint::Direct {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
        })
        .expect("client construction");
        let err = translator
            .translate(&dictionary_request())
            .expect_err("missing key must be rejected");
        assert!(err.to_string().contains("API key is missing"));
    }
}

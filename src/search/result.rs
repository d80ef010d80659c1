//! Provider-neutral search result so callers never branch on the provider.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::web::SearchProviderKind;

/// Number of Kagi snippets stitched together into an answer.
const KAGI_ANSWER_SNIPPETS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub timestamp: DateTime<Local>,
    pub query: String,
    pub model: String,
    pub provider: SearchProviderKind,
    pub answer: String,
    pub response: SearchResponse,
    pub usage: SearchUsage,
    pub citations: Vec<Citation>,
    pub search_results: Vec<SearchHit>,
    pub request_id: String,
    /// Provider-specific fields: `is_safe`, `followup_queries`, `related_searches`, `result_file`
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub content: String,
    pub role: String,
    pub finish_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: Value,
    /// `[n]` marker as it appears in the answer text
    pub reference: String,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub date: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn reference_marker(id: &Value) -> String {
    match id {
        Value::String(id) => format!("[{id}]"),
        other => format!("[{other}]"),
    }
}

impl SearchResult {
    fn empty(query: &str, model: &str, provider: SearchProviderKind) -> Self {
        Self {
            timestamp: Local::now(),
            query: query.to_string(),
            model: model.to_string(),
            provider,
            answer: String::new(),
            response: SearchResponse {
                content: String::new(),
                role: "assistant".to_string(),
                finish_reason: String::new(),
            },
            usage: SearchUsage::default(),
            citations: Vec::new(),
            search_results: Vec::new(),
            request_id: String::new(),
            extras: Map::new(),
        }
    }

    /// Convert a Baidu AI Search envelope; every reference becomes both a citation and a hit.
    pub fn from_baidu(query: &str, model: &str, response: &Value) -> Self {
        let mut result = Self::empty(query, model, SearchProviderKind::Baidu);

        let choice = response.get("choices").and_then(|choices| choices.get(0));
        result.answer = choice
            .and_then(|choice| choice.get("message"))
            .map(|message| str_field(message, "content"))
            .unwrap_or_default();
        result.response.content = result.answer.clone();
        result.response.finish_reason = choice
            .map(|choice| str_field(choice, "finish_reason"))
            .unwrap_or_default();
        result.request_id = str_field(response, "request_id");
        result.extras.insert(
            "is_safe".to_string(),
            response.get("is_safe").cloned().unwrap_or(Value::Bool(true)),
        );

        if let Some(usage) = response.get("usage").filter(|usage| usage.is_object()) {
            let tokens = |key: &str| Some(usage.get(key).and_then(Value::as_u64).unwrap_or(0));
            result.usage = SearchUsage {
                prompt_tokens: tokens("prompt_tokens"),
                completion_tokens: tokens("completion_tokens"),
                total_tokens: tokens("total_tokens"),
                ..SearchUsage::default()
            };
        }

        let references = response.get("references").and_then(Value::as_array);
        for (index, reference) in references.into_iter().flatten().enumerate() {
            let id = reference
                .get("id")
                .cloned()
                .unwrap_or_else(|| Value::from(index + 1));
            result.citations.push(Citation {
                reference: reference_marker(&id),
                id,
                url: str_field(reference, "url"),
                title: str_field(reference, "title"),
                snippet: str_field(reference, "content"),
                date: str_field(reference, "date"),
                kind: Some(opt_str_field(reference, "type").unwrap_or_else(|| "web".to_string())),
                icon: Some(str_field(reference, "icon")),
                website: Some(str_field(reference, "website")),
                web_anchor: Some(str_field(reference, "web_anchor")),
                thumbnail: None,
            });
            result.search_results.push(SearchHit {
                title: str_field(reference, "title"),
                url: str_field(reference, "url"),
                snippet: str_field(reference, "content"),
                date: str_field(reference, "date"),
                source: Some(str_field(reference, "web_anchor")),
            });
        }

        if let Some(followups) = response
            .get("followup_queries")
            .filter(|followups| !is_empty_value(followups))
        {
            result
                .extras
                .insert("followup_queries".to_string(), followups.clone());
        }

        result
    }

    /// Convert a Kagi envelope: type 0 records are results, type 1 records
    /// carry related searches. Kagi has no generated answer, so the first
    /// snippets stand in for one.
    pub fn from_kagi(query: &str, response: &Value) -> Self {
        let mut result = Self::empty(query, "kagi-search", SearchProviderKind::Kagi);
        result.response.finish_reason = "complete".to_string();

        let meta = response.get("meta").filter(|meta| !is_empty_value(meta));
        if let Some(meta) = meta {
            result.request_id = str_field(meta, "id");
            result.usage = SearchUsage {
                api_balance: Some(meta.get("api_balance").and_then(Value::as_f64).unwrap_or(0.0)),
                response_time_ms: Some(meta.get("ms").and_then(Value::as_u64).unwrap_or(0)),
                ..SearchUsage::default()
            };
        }

        let mut related_searches = Vec::new();
        let records = response.get("data").and_then(Value::as_array);
        for record in records.into_iter().flatten() {
            match record.get("t").and_then(Value::as_i64) {
                Some(0) => {
                    let hit = SearchHit {
                        title: str_field(record, "title"),
                        url: str_field(record, "url"),
                        snippet: str_field(record, "snippet"),
                        date: str_field(record, "published"),
                        source: None,
                    };
                    let number = result.citations.len() + 1;
                    result.citations.push(Citation {
                        id: Value::from(number),
                        reference: format!("[{number}]"),
                        url: hit.url.clone(),
                        title: hit.title.clone(),
                        snippet: hit.snippet.clone(),
                        date: hit.date.clone(),
                        kind: None,
                        icon: None,
                        website: None,
                        web_anchor: None,
                        thumbnail: record
                            .get("thumbnail")
                            .filter(|thumbnail| !is_empty_value(thumbnail))
                            .cloned(),
                    });
                    result.search_results.push(hit);
                }
                Some(1) => {
                    if let Some(list) = record.get("list").and_then(Value::as_array) {
                        related_searches.extend(list.iter().cloned());
                    }
                }
                _ => {}
            }
        }

        if !related_searches.is_empty() {
            result
                .extras
                .insert("related_searches".to_string(), Value::Array(related_searches));
        }

        let snippets: Vec<&str> = result
            .search_results
            .iter()
            .take(KAGI_ANSWER_SNIPPETS)
            .map(|hit| hit.snippet.as_str())
            .filter(|snippet| !snippet.is_empty())
            .collect();
        result.answer = snippets.join(" ");
        result.response.content = result.answer.clone();

        result
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

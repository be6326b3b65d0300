use crate::transport::MultipartForm;
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// What a request carries besides its path.
#[derive(Debug)]
pub enum RequestData<T> {
    Empty,
    Query(T),
    Json(T),
    Multipart(MultipartForm),
}

/// A typed backend call: where it goes, how, with what, and what comes back.
pub trait ApiRequest {
    type Data: Serialize;
    type Response: DeserializeOwned;
    const METHOD: Method = Method::GET;

    fn endpoint(&self) -> Cow<'_, str>;

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Empty
    }
}

/// Accepts any payload, including none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyResponse;

impl<'de> Deserialize<'de> for EmptyResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(EmptyResponse)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }
}

/// Flatten a serializable struct into query pairs, skipping nulls.
pub(crate) fn query_pairs<T: Serialize>(data: &T) -> Result<Vec<(String, String)>, serde_json::Error> {
    let value = serde_json::to_value(data)?;
    let serde_json::Value::Object(map) = value else {
        return Ok(Vec::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_response_accepts_anything() {
        for value in [json!(null), json!({}), json!("ok"), json!([1, 2])] {
            assert_eq!(
                serde_json::from_value::<EmptyResponse>(value).unwrap(),
                EmptyResponse
            );
        }
    }

    #[test]
    fn query_pairs_skip_nulls() {
        #[derive(Serialize)]
        struct Filter {
            keyword: Option<String>,
            location: Option<String>,
            page: u32,
        }

        let pairs = query_pairs(&Filter {
            keyword: Some("rust".into()),
            location: None,
            page: 2,
        })
        .unwrap();

        assert_eq!(
            pairs,
            vec![
                ("keyword".to_string(), "rust".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn page_tolerates_missing_counters() {
        let page: Page<u32> = serde_json::from_value(json!({ "content": [1, 2] })).unwrap();
        assert_eq!(page.content, vec![1, 2]);
        assert!(page.is_last());
    }
}

use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LabelSource;
use crate::models::LabelAnnotation;

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Option<Vec<LabelAnnotation>>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Google Cloud Vision `images:annotate` client (label detection only)
pub struct GoogleVisionClient {
    api_url: String,
    api_key: String,
    max_results: u32,
    client: reqwest::Client,
}

impl GoogleVisionClient {
    pub fn new(api_url: String, api_key: String, max_results: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url,
            api_key,
            max_results,
            client,
        })
    }

    fn build_request(&self, image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION".to_string(),
                    max_results: self.max_results,
                }],
            }],
        }
    }

    fn parse_response(response_text: &str) -> Result<Vec<LabelAnnotation>> {
        let annotate_response: AnnotateResponse = serde_json::from_str(response_text)?;

        let Some(first) = annotate_response.responses.into_iter().next() else {
            anyhow::bail!("Vision API returned no responses");
        };

        if let Some(status) = first.error {
            anyhow::bail!("Vision API image error ({}): {}", status.code, status.message);
        }

        Ok(first.label_annotations.unwrap_or_default())
    }
}

/// Strip the request URL (it carries the API key) and flatten the cause chain once
fn transport_error(e: reqwest::Error) -> anyhow::Error {
    if e.is_timeout() {
        return anyhow::anyhow!("Vision API request timed out");
    }

    let e = e.without_url();
    let mut root = None;
    let mut cause = std::error::Error::source(&e);
    while let Some(source) = cause {
        root = Some(source);
        cause = source.source();
    }

    match root {
        Some(root) => anyhow::anyhow!("Vision API request failed: {}: {}", e, root),
        None => anyhow::anyhow!("Vision API request failed: {}", e),
    }
}

#[async_trait::async_trait]
impl LabelSource for GoogleVisionClient {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>> {
        log::debug!("📊 Image size: {} bytes", image.len());

        let request = self.build_request(image);

        log::info!("🤖 Sending label detection request (maxResults={})", self.max_results);

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        log::debug!("📥 Vision API response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.map_err(transport_error)?;
            log::error!("❌ Vision API error response: {}", error_text);
            anyhow::bail!("Vision API error ({}): {}", status, error_text);
        }

        let response_text = response.text().await.map_err(transport_error)?;
        let labels = Self::parse_response(&response_text)?;

        log::debug!(
            "🏷️ Labels: {:?}",
            labels.iter().map(|l| l.description.as_str()).collect::<Vec<_>>()
        );

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANNOTATE_PATH: &str = "/v1/images:annotate";

    fn client_for(server: &MockServer) -> GoogleVisionClient {
        client_with(&server.uri(), "test_key", Duration::from_secs(5))
    }

    fn client_with(base_url: &str, api_key: &str, timeout: Duration) -> GoogleVisionClient {
        GoogleVisionClient::new(
            format!("{}{}", base_url, ANNOTATE_PATH),
            api_key.to_string(),
            10,
            timeout,
        )
        .unwrap()
    }

    /// A local address nothing is listening on
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_sends_label_detection_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ANNOTATE_PATH))
            .and(query_param("key", "test_key"))
            .and(body_partial_json(json!({
                "requests": [{
                    "image": { "content": "aGVsbG8=" },
                    "features": [{ "type": "LABEL_DETECTION", "maxResults": 10 }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{
                    "labelAnnotations": [
                        { "mid": "/m/09qck", "description": "Banana", "score": 0.9 }
                    ]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let labels = client_for(&server).detect_labels(b"hello").await.unwrap();

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].description, "Banana");
        assert_eq!(labels[0].score, 0.9);
    }

    #[tokio::test]
    async fn test_missing_label_annotations_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [{}] })))
            .mount(&server)
            .await;

        let labels = client_for(&server).detect_labels(b"img").await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client_for(&server).detect_labels(b"img").await.unwrap_err();
        let message = err.to_string();

        assert!(message.contains("403"));
        assert!(message.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_connection_refused_hides_api_key() {
        let client = client_with(&closed_port_url(), "SECRET_KEY_123", Duration::from_secs(2));

        let err = client.detect_labels(b"img").await.unwrap_err();
        let message = format!("{:#}", err);

        assert!(message.starts_with("Vision API request failed"));
        assert!(!message.contains("SECRET_KEY_123"));
        assert!(!message.contains("key="));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "responses": [{}] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_with(&server.uri(), "SECRET_KEY_123", Duration::from_millis(200));
        let err = client.detect_labels(b"img").await.unwrap_err();
        let message = format!("{:#}", err);

        assert!(message.contains("timed out"));
        assert!(!message.contains("SECRET_KEY_123"));
    }

    #[test]
    fn test_null_label_annotations_is_empty() {
        let labels =
            GoogleVisionClient::parse_response(r#"{"responses": [{"labelAnnotations": null}]}"#)
                .unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_parse_empty_responses_fails() {
        assert!(GoogleVisionClient::parse_response(r#"{"responses": []}"#).is_err());
        assert!(GoogleVisionClient::parse_response("{}").is_err());
    }

    #[test]
    fn test_parse_image_error() {
        let body = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        let err = GoogleVisionClient::parse_response(body).unwrap_err();
        assert!(err.to_string().contains("Bad image data."));
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        assert!(GoogleVisionClient::parse_response("<html>oops</html>").is_err());
    }

    #[test]
    fn test_labels_keep_api_order() {
        let body = r#"{"responses": [{"labelAnnotations": [
            {"description": "Fruit", "score": 0.95},
            {"description": "apple", "score": 0.8}
        ]}]}"#;
        let labels = GoogleVisionClient::parse_response(body).unwrap();
        let names: Vec<_> = labels.iter().map(|l| l.description.as_str()).collect();
        assert_eq!(names, vec!["Fruit", "apple"]);
    }
}

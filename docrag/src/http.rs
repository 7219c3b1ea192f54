//! JSON-over-HTTPS plumbing shared by the remote embedder and generator.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// POST `body` as JSON with bearer auth and decode the JSON response.
///
/// Errors are flattened to a message; callers wrap it in the error variant
/// of their stage.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    token: &str,
    body: &B,
) -> Result<R, String>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("API returned {status}: {}", error_detail(&body)));
    }

    response.json::<R>().await.map_err(|e| format!("failed to parse response: {e}"))
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": {"message": ..}}` and `{"error": ".."}`; anything
/// else is returned verbatim.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match value.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_handles_both_shapes() {
        assert_eq!(error_detail(r#"{"error":{"message":"bad key"}}"#), "bad key");
        assert_eq!(error_detail(r#"{"error":"Model is loading"}"#), "Model is loading");
        assert_eq!(error_detail("gateway timeout"), "gateway timeout");
    }
}

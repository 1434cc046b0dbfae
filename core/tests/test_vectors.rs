//! Verify URL joining and header overlay against JSON vectors in `test-vectors/`.
//!
//! Join vectors are run through a full dispatch so the base-bypass rule for
//! absolute targets is covered, not just the string join.

use async_trait::async_trait;
use http_intercept::{overlay, Client, DispatchError, HeaderSet, HttpResponse, RequestOptions, Transport};
use parking_lot::Mutex;

/// Remembers the last URL it was asked to send.
#[derive(Default)]
struct LastUrl(Mutex<Option<String>>);

#[async_trait]
impl Transport for LastUrl {
    async fn send(&self, url: &str, _options: &RequestOptions) -> Result<HttpResponse, DispatchError> {
        *self.0.lock() = Some(url.to_string());
        Ok(HttpResponse::new(200, ""))
    }
}

fn pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[tokio::test]
async fn join_test_vectors() {
    let raw = include_str!("../../test-vectors/join.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let client = Client::new(LastUrl::default());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        client.set_base(case["base"].as_str().unwrap());

        client.dispatch(case["target"].as_str().unwrap(), None).await.unwrap();
        let sent = client.transport().0.lock().take().unwrap();
        assert_eq!(sent, case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

#[test]
fn overlay_test_vectors() {
    let raw = include_str!("../../test-vectors/overlay.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let caller = HeaderSet::from_pairs(pairs(&case["caller"]));
        let defaults = HeaderSet::from_pairs(pairs(&case["defaults"]));

        let merged = overlay(&caller, &defaults);
        let got: Vec<(String, String)> = merged
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        assert_eq!(got, pairs(&case["expected"]), "{name}");
    }
}

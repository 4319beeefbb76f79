//! Remote leaderboard over HTTP (wasm only)
//!
//! `POST {url}` with a `{name, score}` body, `GET {url}` returns a ranked
//! JSON list. Submission runs on the browser's task queue and never blocks
//! a frame; reads fall back to LocalStorage.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{LocalStore, ScoreStore, StoreError};
use crate::highscores::{Leaderboard, ScoreEntry};

fn js_err(e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Remote(format!("{e:?}"))
}

async fn fetch_text(request: &Request) -> Result<String, StoreError> {
    let window = web_sys::window().ok_or(StoreError::Unavailable)?;
    let value = JsFuture::from(window.fetch_with_request(request))
        .await
        .map_err(js_err)?;
    let response: Response = value.dyn_into().map_err(js_err)?;
    if !response.ok() {
        return Err(StoreError::Remote(format!("HTTP {}", response.status())));
    }
    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    text.as_string()
        .ok_or_else(|| StoreError::Remote("response body is not text".to_string()))
}

/// Post one score to the remote board
pub async fn post_score(url: &str, entry: &ScoreEntry) -> Result<(), StoreError> {
    let body = serde_json::to_string(entry)?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&wasm_bindgen::JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_err)?;
    fetch_text(&request).await.map(|_| ())
}

/// Fetch the ranked remote board
pub async fn fetch_top(url: &str) -> Result<Leaderboard, StoreError> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
    let json = fetch_text(&request).await?;
    let entries = serde_json::from_str(&json)?;
    Ok(Leaderboard::from_entries(entries))
}

/// Fire-and-forget remote submission. Errors are only logged; the caller
/// keeps its local copy either way.
pub fn post_in_background(url: String, entry: ScoreEntry) {
    wasm_bindgen_futures::spawn_local(async move {
        match post_score(&url, &entry).await {
            Ok(()) => log::info!("Score {} posted to {}", entry.score, url),
            Err(e) => log::warn!("Remote leaderboard unavailable ({e}), kept local copy"),
        }
    });
}

/// Remote board if reachable, otherwise the local one
pub async fn load_best_available(url: Option<&str>) -> Leaderboard {
    if let Some(url) = url {
        match fetch_top(url).await {
            Ok(board) => return board,
            Err(e) => log::warn!("Remote leaderboard unavailable ({e}), using local"),
        }
    }
    LocalStore::new().load().unwrap_or_default()
}

#![allow(dead_code)]

use axum::Router;
use sonixd_core::normalize::NormalizedAlbum;
use sonixd_core::refresh::GridHandle;
use std::sync::Mutex;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCall {
    ScrollTo(f64),
    Reset,
    SetItemData(Vec<String>),
}

/// Grid that records every call the coordinator makes.
#[derive(Default)]
pub struct RecordingGrid {
    calls: Mutex<Vec<GridCall>>,
}

impl RecordingGrid {
    pub fn calls(&self) -> Vec<GridCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn item_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GridCall::SetItemData(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }
}

impl GridHandle for RecordingGrid {
    fn scroll_to(&self, offset: f64) {
        self.calls.lock().unwrap().push(GridCall::ScrollTo(offset));
    }

    fn reset_load_more_items_cache(&self) {
        self.calls.lock().unwrap().push(GridCall::Reset);
    }

    fn set_item_data(&self, items: Vec<NormalizedAlbum>) {
        let ids = items.into_iter().map(|a| a.id).collect();
        self.calls.lock().unwrap().push(GridCall::SetItemData(ids));
    }
}

pub fn subsonic_ok(body: serde_json::Value) -> serde_json::Value {
    let mut inner = serde_json::json!({ "status": "ok", "version": "1.16.1" });
    if let (Some(inner), Some(extra)) = (inner.as_object_mut(), body.as_object()) {
        for (k, v) in extra {
            inner.insert(k.clone(), v.clone());
        }
    }
    serde_json::json!({ "subsonic-response": inner })
}

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_LIMIT: usize = 25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub number: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub value: String,
    #[serde(default = "storage_representation")]
    pub representation: String,
}

fn storage_representation() -> String {
    "storage".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub storage: Storage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub space: Space,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentPage {
    pub results: Vec<Content>,
    pub start: usize,
    pub limit: usize,
    pub size: usize,
}

#[derive(Deserialize)]
pub struct NewContent {
    #[serde(rename = "type", default = "page_kind")]
    pub kind: String,
    pub title: String,
    pub space: Space,
    pub body: Option<Body>,
}

fn page_kind() -> String {
    "page".to_string()
}

#[derive(Deserialize)]
pub struct UpdateContent {
    pub title: Option<String>,
    pub body: Option<Body>,
    pub version: Option<Version>,
}

#[derive(Deserialize)]
pub struct ContentParams {
    pub limit: Option<usize>,
    pub expand: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    contents: BTreeMap<u64, Content>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/rest/api/content", get(list_content).post(create_content))
        .route(
            "/rest/api/content/{id}",
            get(get_content).put(update_content).delete(delete_content),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Strip `body` unless the caller asked for `body.storage`.
fn expanded(content: &Content, expand: Option<&str>) -> Content {
    let wants_body = expand
        .unwrap_or_default()
        .split(',')
        .any(|item| item.trim() == "body.storage");
    let mut content = content.clone();
    if !wants_body {
        content.body = None;
    }
    content
}

async fn list_content(
    State(db): State<Db>,
    Query(params): Query<ContentParams>,
) -> Json<ContentPage> {
    let store = db.read().await;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let results: Vec<Content> = store
        .contents
        .values()
        .take(limit)
        .map(|c| expanded(c, params.expand.as_deref()))
        .collect();
    Json(ContentPage {
        size: results.len(),
        results,
        start: 0,
        limit,
    })
}

async fn create_content(State(db): State<Db>, Json(input): Json<NewContent>) -> Json<Content> {
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    let content = Content {
        id: id.to_string(),
        kind: input.kind,
        title: input.title,
        space: input.space,
        version: Version { number: 1 },
        body: input.body,
    };
    store.contents.insert(id, content.clone());
    tracing::info!(id, title = %content.title, "content created");
    Json(expanded(&content, None))
}

async fn get_content(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<ContentParams>,
) -> Result<Json<Content>, StatusCode> {
    let store = db.read().await;
    store
        .contents
        .get(&id)
        .map(|c| Json(expanded(c, params.expand.as_deref())))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_content(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateContent>,
) -> Result<Json<Content>, StatusCode> {
    let mut store = db.write().await;
    let content = store.contents.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let next = content.version.number + 1;
    if let Some(version) = input.version {
        if version.number != next {
            return Err(StatusCode::CONFLICT);
        }
    }
    if let Some(title) = input.title {
        content.title = title;
    }
    if let Some(body) = input.body {
        content.body = Some(body);
    }
    content.version.number = next;
    tracing::info!(id, version = next, "content updated");
    Ok(Json(expanded(content, None)))
}

async fn delete_content(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .contents
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> Content {
        Content {
            id: "1".to_string(),
            kind: "page".to_string(),
            title: "Test".to_string(),
            space: Space {
                key: "DOC".to_string(),
            },
            version: Version { number: 1 },
            body: Some(Body {
                storage: Storage {
                    value: "<p>hi</p>".to_string(),
                    representation: "storage".to_string(),
                },
            }),
        }
    }

    #[test]
    fn content_serializes_type_field() {
        let json = serde_json::to_value(content()).unwrap();
        assert_eq!(json["type"], "page");
        assert_eq!(json["space"]["key"], "DOC");
        assert_eq!(json["body"]["storage"]["value"], "<p>hi</p>");
    }

    #[test]
    fn body_is_hidden_without_expand() {
        let c = expanded(&content(), None);
        assert!(c.body.is_none());
        let json = serde_json::to_value(c).unwrap();
        assert!(json.get("body").is_none());
    }

    #[test]
    fn body_is_kept_when_expanded() {
        let c = expanded(&content(), Some("version,body.storage"));
        assert!(c.body.is_some());
    }

    #[test]
    fn new_content_defaults_to_page() {
        let input: NewContent =
            serde_json::from_str(r#"{"title":"T","space":{"key":"DOC"}}"#).unwrap();
        assert_eq!(input.kind, "page");
        assert!(input.body.is_none());
    }

    #[test]
    fn new_content_rejects_missing_space() {
        let result: Result<NewContent, _> = serde_json::from_str(r#"{"title":"T"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn storage_defaults_representation() {
        let storage: Storage = serde_json::from_str(r#"{"value":"<p/>"}"#).unwrap();
        assert_eq!(storage.representation, "storage");
    }

    #[test]
    fn update_content_all_fields_optional() {
        let input: UpdateContent = serde_json::from_str("{}").unwrap();
        assert!(input.title.is_none());
        assert!(input.body.is_none());
        assert!(input.version.is_none());
    }
}

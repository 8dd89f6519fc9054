//! Firestore REST adapter for the `pantryItems` collection.
//!
//! Documents use Firestore's typed-value encoding. Dates are written as
//! ISO-8601 `stringValue`s, which is how the web client has always stored them;
//! `timestampValue` is accepted on read as well.

use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};

use pantry_core::PantryItemId;
use pantry_inventory::{NewPantryItem, PantryItem, PantryItemPatch, format_timestamp};

use super::r#trait::{NAME_RANGE_END, PantryStore, StoreError};

pub const COLLECTION: &str = "pantryItems";

/// Firestore-backed pantry collection.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    /// `base_url` is the service root, e.g. `https://firestore.googleapis.com`.
    pub fn new(base_url: &str, project_id: &str, api_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, project_id, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        project_id: &str,
        api_key: Option<String>,
    ) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            base_url.trim_end_matches('/'),
            project_id
        );
        Self {
            client,
            documents_url,
            api_key,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, COLLECTION)
    }

    fn document_url(&self, id: &PantryItemId) -> String {
        format!("{}/{}/{}", self.documents_url, COLLECTION, id)
    }

    fn with_key(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
        req.send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PantryStore for FirestoreStore {
    async fn create(&self, item: &NewPantryItem) -> Result<PantryItemId, StoreError> {
        let req = self
            .with_key(self.client.post(self.collection_url()))
            .json(&json!({ "fields": encode_new_item(item) }));

        let resp = ensure_success(Self::send(req).await?, None).await?;
        let doc: Document = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let id = document_id(&doc.name)?;

        tracing::debug!(%id, "firestore document created");
        Ok(id)
    }

    async fn delete(&self, id: &PantryItemId) -> Result<(), StoreError> {
        let req = self
            .with_key(self.client.delete(self.document_url(id)))
            .query(&[("currentDocument.exists", "true")]);

        ensure_success(Self::send(req).await?, Some(id)).await?;
        Ok(())
    }

    async fn update(&self, id: &PantryItemId, patch: &PantryItemPatch) -> Result<(), StoreError> {
        let mut params: Vec<(&str, &str)> = patch
            .field_paths()
            .into_iter()
            .map(|path| ("updateMask.fieldPaths", path))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let req = self
            .with_key(self.client.patch(self.document_url(id)))
            .query(&params)
            .json(&json!({ "fields": encode_patch(patch) }));

        ensure_success(Self::send(req).await?, Some(id)).await?;
        Ok(())
    }

    async fn fetch_all(&self, prefix: &str) -> Result<Vec<PantryItem>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        let req = self
            .with_key(self.client.post(url))
            .json(&name_range_query(prefix));

        let resp = ensure_success(Self::send(req).await?, None).await?;
        let rows: Vec<RunQueryRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let items = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(|doc| decode_document(&doc))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = items.len(), prefix, "firestore range read");
        Ok(items)
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, JsonValue>,
}

/// One element of a `runQuery` response; rows without a document only carry
/// read metadata.
#[derive(Debug, Deserialize)]
struct RunQueryRow {
    #[serde(default)]
    document: Option<Document>,
}

async fn ensure_success(resp: Response, id: Option<&PantryItemId>) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound(id.clone()));
        }
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<JsonValue>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}

fn string_value(s: &str) -> JsonValue {
    json!({ "stringValue": s })
}

fn integer_value(n: u32) -> JsonValue {
    json!({ "integerValue": n.to_string() })
}

fn encode_new_item(item: &NewPantryItem) -> Map<String, JsonValue> {
    let mut fields = Map::new();
    fields.insert("name".into(), string_value(&item.name));
    fields.insert("category".into(), string_value(&item.category));
    fields.insert("quantity".into(), integer_value(item.quantity));
    fields.insert("expiryDate".into(), string_value(&format_timestamp(&item.expiry_date)));
    fields.insert("addedDate".into(), string_value(&format_timestamp(&item.added_date)));
    fields.insert("userId".into(), string_value(&item.user_id));
    fields
}

fn encode_patch(patch: &PantryItemPatch) -> Map<String, JsonValue> {
    let mut fields = Map::new();
    if let Some(name) = &patch.name {
        fields.insert("name".into(), string_value(name));
    }
    if let Some(category) = &patch.category {
        fields.insert("category".into(), string_value(category));
    }
    if let Some(quantity) = patch.quantity {
        fields.insert("quantity".into(), integer_value(quantity));
    }
    if let Some(expiry_date) = &patch.expiry_date {
        fields.insert("expiryDate".into(), string_value(&format_timestamp(expiry_date)));
    }
    if let Some(user_id) = &patch.user_id {
        fields.insert("userId".into(), string_value(user_id));
    }
    fields
}

/// `runQuery` body for the name range starting at `prefix`; an empty prefix
/// reads the whole collection.
fn name_range_query(prefix: &str) -> JsonValue {
    if prefix.is_empty() {
        return json!({
            "structuredQuery": {
                "from": [{ "collectionId": COLLECTION }]
            }
        });
    }

    let mut upper = prefix.to_string();
    upper.push(NAME_RANGE_END);

    json!({
        "structuredQuery": {
            "from": [{ "collectionId": COLLECTION }],
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        {
                            "fieldFilter": {
                                "field": { "fieldPath": "name" },
                                "op": "GREATER_THAN_OR_EQUAL",
                                "value": { "stringValue": prefix }
                            }
                        },
                        {
                            "fieldFilter": {
                                "field": { "fieldPath": "name" },
                                "op": "LESS_THAN_OR_EQUAL",
                                "value": { "stringValue": upper }
                            }
                        }
                    ]
                }
            }
        }
    })
}

/// Last path segment of a full document resource name.
fn document_id(name: &str) -> Result<PantryItemId, StoreError> {
    name.rsplit('/')
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| StoreError::Decode(format!("document name '{name}': {e}")))
}

fn field<'a>(doc: &'a Document, key: &str) -> Result<&'a JsonValue, StoreError> {
    doc.fields
        .get(key)
        .ok_or_else(|| StoreError::Decode(format!("{}: missing field '{key}'", doc.name)))
}

fn decode_string(doc: &Document, key: &str) -> Result<String, StoreError> {
    field(doc, key)?["stringValue"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| StoreError::Decode(format!("{}: '{key}' is not a string", doc.name)))
}

fn decode_quantity(doc: &Document) -> Result<u32, StoreError> {
    let value = field(doc, "quantity")?;
    let bad = || StoreError::Decode(format!("{}: 'quantity' is not a non-negative integer", doc.name));

    if let Some(raw) = value.get("integerValue") {
        // The REST API sends int64 as a decimal string; tolerate plain numbers.
        let n = match raw {
            JsonValue::String(s) => s.parse::<i64>().map_err(|_| bad())?,
            JsonValue::Number(n) => n.as_i64().ok_or_else(|| bad())?,
            _ => return Err(bad()),
        };
        return u32::try_from(n).map_err(|_| bad());
    }
    if let Some(d) = value.get("doubleValue").and_then(JsonValue::as_f64) {
        if d.fract() == 0.0 && d >= 0.0 && d <= f64::from(u32::MAX) {
            return Ok(d as u32);
        }
    }
    Err(bad())
}

fn decode_timestamp(doc: &Document, key: &str) -> Result<DateTime<Utc>, StoreError> {
    let value = field(doc, key)?;
    let raw = value["stringValue"]
        .as_str()
        .or_else(|| value["timestampValue"].as_str())
        .ok_or_else(|| StoreError::Decode(format!("{}: '{key}' is not a timestamp", doc.name)))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("{}: '{key}' = '{raw}': {e}", doc.name)))
}

fn decode_document(doc: &Document) -> Result<PantryItem, StoreError> {
    let id = document_id(&doc.name)?;
    Ok(PantryItem::new(
        id,
        NewPantryItem {
            name: decode_string(doc, "name")?,
            category: decode_string(doc, "category")?,
            quantity: decode_quantity(doc)?,
            expiry_date: decode_timestamp(doc, "expiryDate")?,
            added_date: decode_timestamp(doc, "addedDate")?,
            user_id: decode_string(doc, "userId")?,
        },
    ))
}

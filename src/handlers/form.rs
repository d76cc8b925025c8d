//! Request bodies that may arrive either as JSON or as multipart forms.
//!
//! Text parts become string fields; file parts are kept in memory until
//! the handler decides which folder they belong in.

use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::filter::FilterParams;
use crate::storage::{self, Folder, ObjectStorage, UploadedAsset};

#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

/// A JSON object or a multipart form, normalized to fields plus files
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: Map<String, Value>,
    pub files: HashMap<String, FilePart>,
}

impl Submission {
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                files: HashMap::new(),
            }),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }

    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut submission = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            if file_name.is_some() {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                submission.files.insert(
                    name,
                    FilePart {
                        file_name,
                        content_type,
                        data,
                    },
                );
            } else {
                let text = field.text().await?;
                // An empty form input means "not supplied"
                if !text.trim().is_empty() {
                    submission.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(submission)
    }

    /// Deserialize the fields into a body type
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
    }

    pub fn has_file(&self, field: &str) -> bool {
        self.files.contains_key(field)
    }

    /// Validate and store the files named in `folders`. Nothing is kept when
    /// any file is rejected.
    pub async fn store_files(
        &mut self,
        storage: &dyn ObjectStorage,
        folders: &[(&str, Folder)],
        limit: usize,
    ) -> Result<HashMap<String, UploadedAsset>, ApiError> {
        for (field, _) in folders {
            if let Some(file) = self.files.get(*field) {
                storage::validate(&file.content_type, file.data.len(), limit)?;
            }
        }

        let mut stored = HashMap::new();
        for (field, folder) in folders {
            let Some(file) = self.files.remove(*field) else {
                continue;
            };
            match storage
                .put(*folder, file.file_name.as_deref(), &file.content_type, file.data.to_vec())
                .await
            {
                Ok(asset) => {
                    stored.insert(field.to_string(), asset);
                }
                Err(e) => {
                    discard(storage, stored.into_values()).await;
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }
}

/// Remove stored files whose database write did not happen
pub async fn discard(storage: &dyn ObjectStorage, assets: impl IntoIterator<Item = UploadedAsset>) {
    for asset in assets {
        if let Err(e) = storage.delete(&asset.key).await {
            tracing::error!("Failed to remove orphaned upload {}: {}", asset.key, e);
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(value) = Json::<Value>::from_request(req, state).await?;
            Self::from_json(value)
        }
    }
}

/// Query-string parameters as filter input
pub fn filter_params(query: HashMap<String, String>) -> FilterParams {
    FilterParams::from(query)
}

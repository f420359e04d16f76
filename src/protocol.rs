use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::WebDAVConfig;
use crate::errors::SyncError;
use crate::transport::{select_transport, DavRequest, HttpTransport};
use crate::xml_parser::parse_backup_listing;

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
    <D:prop>
        <D:displayname/>
        <D:resourcetype/>
    </D:prop>
</D:propfind>"#;

/// Client for the five WebDAV primitives against one backup collection.
/// Stateless between calls; the facade builds one per operation.
pub struct WebDAVClient {
    transport: Arc<dyn HttpTransport>,
    config: WebDAVConfig,
}

impl WebDAVClient {
    pub fn new(config: WebDAVConfig) -> Result<Self, SyncError> {
        let transport = select_transport(&config)?;
        Ok(Self { transport, config })
    }

    pub fn with_transport(config: WebDAVConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    fn request(&self, method: Method, url: String) -> DavRequest {
        DavRequest::new(method, url).basic_auth(&self.config.username, &self.config.password)
    }

    /// Creates the backup collection. Idempotent: a 405 means the
    /// collection already exists and is treated as success.
    pub async fn ensure_collection(&self) -> Result<(), SyncError> {
        let url = self.config.collection_url();
        debug!("MKCOL {}", url);

        let response = self
            .transport
            .execute(self.request(dav_method(b"MKCOL"), url))
            .await?;

        if response.ok() || response.status() == 405 {
            Ok(())
        } else {
            Err(SyncError::DirectoryCreation {
                status: response.status(),
            })
        }
    }

    /// Writes a serialized document under the given filename.
    pub async fn put_object<T: Serialize>(
        &self,
        filename: &str,
        document: &T,
    ) -> Result<(), SyncError> {
        let body = serde_json::to_string(document).map_err(|e| SyncError::Parse {
            details: format!("snapshot could not be serialized: {}", e),
        })?;

        let url = self.config.object_url(filename);
        debug!("PUT {}", url);

        let response = self
            .transport
            .execute(
                self.request(Method::PUT, url)
                    .header("Content-Type", "application/json")
                    .body(body),
            )
            .await?;

        if response.ok() {
            Ok(())
        } else {
            Err(SyncError::Write {
                status: response.status(),
            })
        }
    }

    /// Lists the backup objects in the collection. Order is unspecified
    /// here; the facade applies the retention policy's ordering.
    pub async fn list_objects(&self) -> Result<Vec<String>, SyncError> {
        let url = self.config.collection_url();
        debug!("PROPFIND {}", url);

        let response = self
            .transport
            .execute(
                self.request(dav_method(b"PROPFIND"), url)
                    .header("Depth", "1")
                    .header("Content-Type", "application/xml")
                    .body(PROPFIND_BODY),
            )
            .await?;

        // 207 Multi-Status falls inside the 2xx success range.
        if !response.ok() {
            return Err(SyncError::List {
                status: response.status(),
            });
        }

        parse_backup_listing(&response.text()?)
    }

    /// Fetches and deserializes one backup object. A 404 is the expected
    /// first-run state and maps to the distinct `NotFound` error.
    pub async fn get_object<T: DeserializeOwned>(&self, filename: &str) -> Result<T, SyncError> {
        let url = self.config.object_url(filename);
        debug!("GET {}", url);

        let response = self.transport.execute(self.request(Method::GET, url)).await?;

        if response.status() == 404 {
            return Err(SyncError::NotFound {
                filename: filename.to_string(),
            });
        }

        if !response.ok() {
            return Err(SyncError::Read {
                status: response.status(),
            });
        }

        response.json()
    }

    /// Removes one backup object.
    pub async fn delete_object(&self, filename: &str) -> Result<(), SyncError> {
        let url = self.config.object_url(filename);
        debug!("DELETE {}", url);

        let response = self
            .transport
            .execute(self.request(Method::DELETE, url))
            .await?;

        if response.ok() {
            Ok(())
        } else {
            Err(SyncError::Delete {
                status: response.status(),
            })
        }
    }
}

fn dav_method(name: &'static [u8]) -> Method {
    // Only called with the WebDAV verb literals above.
    Method::from_bytes(name).expect("valid WebDAV method name")
}

//! Web gateway HTTP client
//!
//! Implements the GridStore trait against a gateway endpoint. Objects map
//! onto plain GET/PUT/DELETE; table and stream calls go to the same object
//! URL with a function selector header and a JSON body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use gs_core::alias::Alias;
use gs_core::error::{Error, Result};
use gs_core::path::RemotePath;
use gs_core::scan::fetch::{ItemsPage, PageRequest};
use gs_core::traits::{
    ContainerEntry, GridStore, ListOptions, ObjectEntry, ObjectListing, PutRecordsReceipt,
    RecordBatch, RecordData, RecordResult, SeekTarget, StreamRecord,
};
use gs_core::value::Item;

use crate::wire::{
    CreateStreamRequest, GetItemRequest, GetItemResponse, GetItemsRequest, GetItemsResponse,
    GetRecordsRequest, GetRecordsResponse, ListContainersResponse, ListObjectsResponse,
    PutItemRequest, PutRecordsRequest, PutRecordsResponse, SeekShardRequest, SeekShardResponse,
    UpdateItemRequest, decode_blob, decode_item, encode_item, encode_record,
};

/// Header selecting the gateway function for table and stream calls
const FUNCTION_HEADER: &str = "X-Gateway-Function";

/// Header carrying a session access key instead of basic auth
const SESSION_KEY_HEADER: &str = "X-Session-Key";

/// HTTP client for one gateway endpoint
pub struct GatewayClient {
    http: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
    access_key: Option<String>,
}

impl GatewayClient {
    /// Create a client from an alias
    pub fn new(alias: &Alias) -> Result<Self> {
        url::Url::parse(&alias.endpoint)?;

        let timeout = alias.timeout_config();
        let http = Client::builder()
            .danger_accept_invalid_certs(alias.insecure)
            .connect_timeout(Duration::from_millis(timeout.connect_ms))
            .timeout(Duration::from_millis(timeout.read_ms))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: alias.endpoint.trim_end_matches('/').to_string(),
            username: alias.username.clone(),
            password: alias.password.clone(),
            access_key: alias.access_key.clone(),
        })
    }

    /// URL for an object, with each key segment percent-encoded
    fn object_url(&self, path: &RemotePath) -> String {
        let mut url = format!("{}/{}", self.endpoint, path.container);
        if !path.key.is_empty() {
            let encoded: Vec<String> = path
                .key
                .trim_end_matches('/')
                .split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect();
            url.push('/');
            url.push_str(&encoded.join("/"));
        }
        url
    }

    fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.access_key {
            builder.header(SESSION_KEY_HEADER, key)
        } else if let Some(user) = &self.username {
            builder.basic_auth(user, self.password.as_deref())
        } else {
            builder
        }
    }

    /// Send a request and fail on non-success statuses
    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let response = self
            .apply_auth(builder)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{context} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_error(status, &body));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read {context} response: {e}")))?;
        if text.is_empty() {
            serde_json::from_str("null").map_err(Error::Json)
        } else {
            serde_json::from_str(&text).map_err(Error::Json)
        }
    }

    /// Gateway function call returning a JSON body
    async fn call_function<B, T>(&self, path: &RemotePath, function: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.object_url(path);
        tracing::debug!("Gateway function {} on {}", function, url);
        let builder = self
            .http
            .put(&url)
            .header(FUNCTION_HEADER, function)
            .json(body);
        let response = self.send(builder, function).await?;
        Self::read_json(response, function).await
    }

    /// Gateway function call where only the status matters
    async fn call_function_no_response<B>(
        &self,
        path: &RemotePath,
        function: &str,
        body: &B,
    ) -> Result<()>
    where
        B: Serialize + Sync,
    {
        let url = self.object_url(path);
        tracing::debug!("Gateway function {} on {}", function, url);
        let builder = self
            .http
            .put(&url)
            .header(FUNCTION_HEADER, function)
            .json(body);
        self.send(builder, function).await?;
        Ok(())
    }
}

/// Map a gateway error status onto the error taxonomy.
///
/// Client errors are non-retryable rejections; everything in the 5xx range
/// is treated as transport-level and worth retrying.
fn map_error(status: StatusCode, body: &str) -> Error {
    let detail = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    };
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(detail),
        StatusCode::CONFLICT => Error::Conflict(detail),
        s if s.is_client_error() => Error::Server(format!("HTTP {}: {detail}", s.as_u16())),
        s => Error::Transport(format!("HTTP {}: {detail}", s.as_u16())),
    }
}

fn arrival_timestamp(sec: Option<i64>, nsec: Option<i64>) -> Option<jiff::Timestamp> {
    let sec = sec?;
    jiff::Timestamp::new(sec, nsec.unwrap_or(0) as i32).ok()
}

#[async_trait]
impl GridStore for GatewayClient {
    async fn list_containers(&self) -> Result<Vec<ContainerEntry>> {
        let url = format!("{}/", self.endpoint);
        let response = self.send(self.http.get(&url), "ListContainers").await?;
        let listing: ListContainersResponse = Self::read_json(response, "ListContainers").await?;

        Ok(listing
            .containers
            .into_iter()
            .map(|container| ContainerEntry {
                id: container.id,
                name: container.name,
                created: container.creation_date.and_then(|s| s.parse().ok()),
            })
            .collect())
    }

    async fn list_objects(&self, path: &RemotePath, options: ListOptions) -> Result<ObjectListing> {
        let url = format!("{}/{}", self.endpoint, path.container);
        let mut params: Vec<(&str, String)> = Vec::new();
        if !path.key.is_empty() {
            params.push(("prefix", path.key.clone()));
        }
        if !options.recursive {
            params.push(("delimiter", "/".to_string()));
        }
        if let Some(marker) = &options.marker {
            params.push(("marker", marker.clone()));
        }
        if let Some(max) = options.max_keys {
            params.push(("max-keys", max.to_string()));
        }

        let response = self
            .send(self.http.get(&url).query(&params), "ListObjects")
            .await?;
        let listing: ListObjectsResponse = Self::read_json(response, "ListObjects").await?;

        let mut entries: Vec<ObjectEntry> = listing
            .common_prefixes
            .into_iter()
            .map(ObjectEntry::prefix)
            .collect();
        for object in listing.contents {
            let mut entry = ObjectEntry::object(object.key, object.size);
            entry.last_modified = object.last_modified.and_then(|s| s.parse().ok());
            entries.push(entry);
        }

        Ok(ObjectListing {
            entries,
            truncated: listing.is_truncated,
            next_marker: listing.next_marker,
        })
    }

    async fn get_object(&self, path: &RemotePath) -> Result<Vec<u8>> {
        let url = self.object_url(path);
        let response = self.send(self.http.get(&url), "GetObject").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read object body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn put_object(&self, path: &RemotePath, data: Vec<u8>) -> Result<()> {
        let url = self.object_url(path);
        self.send(self.http.put(&url).body(data), "PutObject").await?;
        Ok(())
    }

    async fn delete_object(&self, path: &RemotePath) -> Result<()> {
        let url = self.object_url(path);
        self.send(self.http.delete(&url), "DeleteObject").await?;
        Ok(())
    }

    async fn get_item(&self, path: &RemotePath, attributes: &[String]) -> Result<Item> {
        let body = GetItemRequest {
            attributes_to_get: attributes.join(","),
        };
        let response: GetItemResponse = self.call_function(path, "GetItem", &body).await?;
        decode_item(&response.item)
    }

    async fn put_item<'a>(
        &self,
        path: &RemotePath,
        item: &Item,
        condition: Option<&'a str>,
    ) -> Result<()> {
        let body = PutItemRequest {
            item: encode_item(item),
            condition_expression: condition.map(String::from),
        };
        self.call_function_no_response(path, "PutItem", &body).await
    }

    async fn update_item<'a>(
        &self,
        path: &RemotePath,
        expression: &str,
        condition: Option<&'a str>,
    ) -> Result<()> {
        let body = UpdateItemRequest {
            update_expression: expression.to_string(),
            condition_expression: condition.map(String::from),
        };
        self.call_function_no_response(path, "UpdateItem", &body)
            .await
    }

    async fn get_items(&self, request: &PageRequest) -> Result<ItemsPage> {
        let body = GetItemsRequest {
            attributes_to_get: request.attributes.join(","),
            filter_expression: request.filter.clone(),
            marker: request.marker.clone(),
            limit: request.limit,
            segment: request.segment.map(|s| s.index),
            total_segment: request.segment.map(|s| s.total),
        };
        let response: GetItemsResponse =
            self.call_function(&request.path, "GetItems", &body).await?;

        let mut items = Vec::with_capacity(response.items.len());
        for wire_item in &response.items {
            items.push(decode_item(wire_item)?);
        }
        Ok(ItemsPage {
            items,
            next_marker: response.next_marker,
            last: response.last_item_included.as_deref() == Some("TRUE"),
        })
    }

    async fn delete_item(&self, path: &RemotePath) -> Result<()> {
        // items are addressed and deleted like objects
        self.delete_object(path).await
    }

    async fn create_stream(
        &self,
        path: &RemotePath,
        shards: u32,
        retention_hours: u32,
    ) -> Result<()> {
        let body = CreateStreamRequest {
            shard_count: shards,
            retention_period_hours: retention_hours,
        };
        self.call_function_no_response(path, "CreateStream", &body)
            .await
    }

    async fn seek_shard(&self, path: &RemotePath, target: SeekTarget) -> Result<String> {
        let body = match target {
            SeekTarget::Earliest => SeekShardRequest::of_type("EARLIEST"),
            SeekTarget::Latest => SeekShardRequest::of_type("LATEST"),
            SeekTarget::Sequence(sequence) => SeekShardRequest {
                starting_sequence_number: Some(sequence),
                ..SeekShardRequest::of_type("SEQUENCE")
            },
            SeekTarget::Time(timestamp) => SeekShardRequest {
                timestamp_sec: Some(timestamp.as_second()),
                timestamp_n_sec: Some(timestamp.subsec_nanosecond() as i64),
                ..SeekShardRequest::of_type("TIME")
            },
        };
        let response: SeekShardResponse = self.call_function(path, "SeekShard", &body).await?;
        Ok(response.location)
    }

    async fn get_records(
        &self,
        path: &RemotePath,
        location: &str,
        max_records: usize,
    ) -> Result<RecordBatch> {
        let body = GetRecordsRequest {
            location: location.to_string(),
            limit: max_records,
        };
        let response: GetRecordsResponse = self.call_function(path, "GetRecords", &body).await?;

        let mut records = Vec::with_capacity(response.records.len());
        for wire in response.records {
            records.push(StreamRecord {
                sequence: wire.sequence_number,
                partition_key: wire.partition_key,
                client_info: wire.client_info.as_deref().map(decode_blob).transpose()?,
                arrival_time: arrival_timestamp(wire.arrival_time_sec, wire.arrival_time_n_sec),
                data: decode_blob(&wire.data)?,
            });
        }
        Ok(RecordBatch {
            records,
            next_location: response.next_location,
            records_behind_latest: response.records_behind_latest,
        })
    }

    async fn put_records(
        &self,
        path: &RemotePath,
        records: &[RecordData],
    ) -> Result<PutRecordsReceipt> {
        let body = PutRecordsRequest {
            records: records.iter().map(encode_record).collect(),
        };
        let response: PutRecordsResponse = self.call_function(path, "PutRecords", &body).await?;

        Ok(PutRecordsReceipt {
            failed: response.failed_record_count,
            results: response
                .records
                .into_iter()
                .map(|wire| RecordResult {
                    sequence: wire.sequence_number,
                    shard: wire.shard_id,
                    error_code: wire.error_code,
                    error_message: wire.error_message,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GatewayClient {
        let alias = Alias::new("test", "http://localhost:8081/");
        GatewayClient::new(&alias).unwrap()
    }

    #[test]
    fn test_client_requires_valid_endpoint() {
        let alias = Alias::new("test", "not a url");
        assert!(GatewayClient::new(&alias).is_err());
    }

    #[test]
    fn test_object_url_encodes_segments() {
        let client = test_client();

        let path = RemotePath::new("test", "projects", "dir/my file.txt");
        assert_eq!(
            client.object_url(&path),
            "http://localhost:8081/projects/dir/my%20file.txt"
        );

        let path = RemotePath::new("test", "projects", "table/.#schema");
        assert_eq!(
            client.object_url(&path),
            "http://localhost:8081/projects/table/.%23schema"
        );

        let path = RemotePath::new("test", "projects", "");
        assert_eq!(client.object_url(&path), "http://localhost:8081/projects");
    }

    #[test]
    fn test_map_error_statuses() {
        assert!(matches!(
            map_error(StatusCode::NOT_FOUND, "no such key"),
            Error::NotFound(_)
        ));
        assert!(matches!(
            map_error(StatusCode::UNAUTHORIZED, ""),
            Error::Auth(_)
        ));
        assert!(matches!(
            map_error(StatusCode::FORBIDDEN, "denied"),
            Error::Auth(_)
        ));
        assert!(matches!(
            map_error(StatusCode::CONFLICT, "exists"),
            Error::Conflict(_)
        ));
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, "bad filter"),
            Error::Server(_)
        ));
        assert!(matches!(
            map_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            Error::Transport(_)
        ));
    }

    #[test]
    fn test_arrival_timestamp() {
        assert!(arrival_timestamp(None, None).is_none());

        let ts = arrival_timestamp(Some(1_700_000_000), Some(500)).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_nanosecond(), 500);
    }
}

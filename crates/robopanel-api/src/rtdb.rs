//! REST + event-stream client for Firebase-RTDB-compatible stores.
//!
//! Writes and one-shot reads go through plain HTTP verbs on
//! `{base}/{path}.json`. Subscriptions issue a streaming GET with
//! `Accept: text/event-stream`; the server replays the current value as an
//! initial `put` frame and then pushes `put`/`patch` frames on every
//! change. The watch loop folds frames into the current value so each
//! emitted [`StoreEvent::Value`] is the complete channel value.
//!
//! There is deliberately no reconnect logic here: when the stream fails it
//! emits one error event and ends. Recovery (re-attach) is owned by the
//! subscriber, which knows whether re-attaching is still wanted.

use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header;
use serde_json::Value;

use crate::error::Error;
use crate::sse::{PathPayload, SseFrameParser, apply_update};
use crate::store::{KeyPathStore, StoreEvent};
use crate::transport::StoreConfig;

/// Client for a remote key-path store.
///
/// Cheaply cloneable; all clones share the underlying connection pools.
#[derive(Debug, Clone)]
pub struct RtdbClient {
    config: StoreConfig,
    http: reqwest::Client,
    stream_http: reqwest::Client,
}

impl RtdbClient {
    pub fn new(config: StoreConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        let stream_http = config.build_stream_client()?;
        Ok(Self {
            config,
            http,
            stream_http,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Map a non-success response into [`Error::Http`], preserving the
    /// body for diagnostics (the store sends a JSON error envelope).
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Http {
            status: status.as_u16(),
            body,
        })
    }
}

impl KeyPathStore for RtdbClient {
    async fn put(&self, path: &str, value: Value) -> Result<(), Error> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%path, "store put");
        let resp = self.http.put(url).json(&value).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.config.endpoint(path)?;
        tracing::debug!(%path, "store delete");
        let resp = self.http.delete(url).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.config.endpoint(path)?;
        let resp = self.http.get(url).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    fn watch(&self, path: &str) -> BoxStream<'static, StoreEvent> {
        let client = self.stream_http.clone();
        let endpoint = self.config.endpoint(path);
        let path = path.to_owned();

        Box::pin(async_stream::stream! {
            let url = match endpoint {
                Ok(url) => url,
                Err(e) => {
                    yield StoreEvent::Error(e);
                    return;
                }
            };

            let resp = match client
                .get(url)
                .header(header::ACCEPT, "text/event-stream")
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield StoreEvent::Error(e.into());
                    return;
                }
            };
            let resp = match RtdbClient::check(resp).await {
                Ok(resp) => resp,
                Err(e) => {
                    yield StoreEvent::Error(e);
                    return;
                }
            };

            tracing::debug!(%path, "subscription attached");

            let mut body = resp.bytes_stream();
            let mut parser = SseFrameParser::new();
            let mut current = Value::Null;

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield StoreEvent::Error(e.into());
                        return;
                    }
                };

                for frame in parser.feed(&String::from_utf8_lossy(&chunk)) {
                    match frame.event.as_str() {
                        "put" | "patch" => {
                            let payload = match PathPayload::parse(&frame.data) {
                                Ok(payload) => payload,
                                Err(e) => {
                                    yield StoreEvent::Error(e);
                                    return;
                                }
                            };
                            apply_update(
                                &mut current,
                                &payload.path,
                                payload.data,
                                frame.event == "patch",
                            );
                            yield StoreEvent::Value(current.clone());
                        }
                        "keep-alive" => {}
                        "cancel" => {
                            yield StoreEvent::Error(Error::StreamClosed {
                                reason: "cancelled by store".into(),
                            });
                            return;
                        }
                        "auth_revoked" => {
                            yield StoreEvent::Error(Error::AuthRevoked);
                            return;
                        }
                        other => {
                            tracing::debug!(event = other, "ignoring unknown stream event");
                        }
                    }
                }
            }

            // Streams are infinite by contract; EOF means the server or an
            // intermediary dropped us.
            yield StoreEvent::Error(Error::StreamClosed {
                reason: "stream ended".into(),
            });
        })
    }
}

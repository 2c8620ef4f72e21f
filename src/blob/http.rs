// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{BlobRangeFetcher, ByteRange, FetchError};
use crate::utils::net::global_http_client;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, header};
use url::Url;

/// Fetches ranges of an object served over HTTP(S) using `Range` requests.
#[derive(Debug, Clone)]
pub struct HttpRangeFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpRangeFetcher {
    pub fn new(url: Url) -> Self {
        Self::with_client(global_http_client(), url)
    }

    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn check_status(&self, status: StatusCode, expected: StatusCode) -> Result<(), FetchError> {
        if status != expected {
            return Err(FetchError::Status {
                status,
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobRangeFetcher for HttpRangeFetcher {
    async fn size(&self) -> Result<u64, FetchError> {
        let response = self.client.head(self.url.clone()).send().await?;
        self.check_status(response.status(), StatusCode::OK)?;
        // `Response::content_length` reports the (empty) body of a HEAD response,
        // so the header is read directly.
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| FetchError::MissingContentLength(self.url.clone()))
    }

    async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(header::RANGE, range.to_header_value())
            .send()
            .await?;
        self.check_status(response.status(), StatusCode::PARTIAL_CONTENT)?;
        Ok(response.bytes().await?)
    }
}

// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{BlobRangeFetcher, FileRangeFetcher, HttpRangeFetcher};
use anyhow::Context as _;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

/// Where an archive lives, as written in a batch job's input:
/// - `s3://bucket/path/to/object.arc.gz`
/// - `http://` or `https://` URLs
/// - anything else is a path on the local file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobLocation {
    S3 { bucket: String, key: String },
    Http(Url),
    File(PathBuf),
}

impl FromStr for BlobLocation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        anyhow::ensure!(!s.is_empty(), "empty archive location");
        if let Some(rest) = s.strip_prefix("s3://").or_else(|| s.strip_prefix("s3n://")) {
            let (bucket, key) = rest
                .split_once('/')
                .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
                .with_context(|| format!("expected s3://<bucket>/<key>, got {s}"))?;
            return Ok(Self::S3 {
                bucket: bucket.into(),
                key: key.into(),
            });
        }
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Http(url)),
            Ok(url) if url.scheme() == "file" => Ok(Self::File(
                url.to_file_path()
                    .map_err(|()| anyhow::anyhow!("invalid file URL {s}"))?,
            )),
            Ok(url) if url.scheme().len() > 1 => {
                anyhow::bail!("unsupported protocol {} in {s}", url.scheme())
            }
            // Bare paths, including Windows drive letters.
            _ => Ok(Self::File(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl BlobLocation {
    /// Builds a fetcher for this location. `s3_endpoint` is a URL template in
    /// which `{bucket}` and `{key}` are substituted, e.g.
    /// `https://{bucket}.s3.amazonaws.com/{key}`.
    pub fn fetcher(&self, s3_endpoint: &str) -> anyhow::Result<Arc<dyn BlobRangeFetcher>> {
        Ok(match self {
            Self::S3 { bucket, key } => {
                let url = s3_url(s3_endpoint, bucket, key);
                let url = Url::parse(&url)
                    .with_context(|| format!("invalid S3 endpoint for {self}: {url}"))?;
                Arc::new(HttpRangeFetcher::new(url))
            }
            Self::Http(url) => Arc::new(HttpRangeFetcher::new(url.clone())),
            Self::File(path) => Arc::new(FileRangeFetcher::new(path)),
        })
    }

    /// The HTTP URL that will be requested, if any.
    pub fn http_url(&self, s3_endpoint: &str) -> Option<String> {
        match self {
            Self::S3 { bucket, key } => Some(s3_url(s3_endpoint, bucket, key)),
            Self::Http(url) => Some(url.to_string()),
            Self::File(_) => None,
        }
    }
}

fn s3_url(endpoint: &str, bucket: &str, key: &str) -> String {
    endpoint.replace("{bucket}", bucket).replace("{key}", key)
}

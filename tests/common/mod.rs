// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write as _;
use std::path::{Path, PathBuf};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use flate2::{Compression, write::GzEncoder};

pub fn tool() -> Command {
    let mut cmd = cargo_bin_cmd!("arc-tool");
    cmd.env_remove("ARC_STREAM_CONFIG").arg("--color").arg("never");
    cmd
}

pub const HTML_URL: &str = "http://example.com/";

/// An uncompressed archive with one HTML page and one image.
pub fn arc_fixture() -> Vec<u8> {
    let body = "1 0 CommonCrawl\nURL IP-address Archive-date Content-type Archive-length\n\n";
    let mut archive = format!(
        "filedesc://fixture.arc 0.0.0.0 20200101000000 text/plain {}\n{body}",
        body.len()
    );
    let records = [
        (
            HTML_URL,
            "text/html",
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html><body><h1>Hello</h1><p>fish &amp; chips</p></body></html>",
        ),
        ("http://example.com/logo.png", "image/png", "not really a png"),
    ];
    for (url, content_type, payload) in records {
        archive.push_str(&format!(
            "{url} 1.2.3.4 20200101000100 {content_type} {}\n{payload}\n",
            payload.len()
        ));
    }
    archive.into_bytes()
}

/// Writes the fixture gzipped into `dir`, returning its path.
pub fn write_gzipped_fixture(dir: &Path) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&arc_fixture()).unwrap();
    let path = dir.join("fixture.arc.gz");
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

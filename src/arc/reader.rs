// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{ArcError, ArcRecord, ArcRecordCodec, VersionBlock, VersionBlockHeader};
use futures::Stream;
use pin_project_lite::pin_project;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncReadExt as _};
use tokio_util::codec::FramedRead;

/// The header line is short; anything longer is not an ARC container.
const MAX_HEADER_LINE_LEN: u64 = 4096;

pin_project! {
    /// Stream of ARC records, decoded lazily from an uncompressed byte stream.
    ///
    /// The stream is forward-only and ends after the first error: once a
    /// record is corrupt, the offsets of the following ones are unknown.
    pub struct ArcReader<ReaderT> {
        #[pin]
        frames: FramedRead<ReaderT, ArcRecordCodec>,
        version_block: VersionBlock,
        done: bool,
    }
}

impl<ReaderT: AsyncBufRead + Unpin> ArcReader<ReaderT> {
    /// Reads the version block. Records are decoded on demand afterwards.
    pub async fn new(mut reader: ReaderT) -> Result<Self, ArcError> {
        let mut line = Vec::new();
        (&mut reader)
            .take(MAX_HEADER_LINE_LEN)
            .read_until(b'\n', &mut line)
            .await?;
        if line.is_empty() {
            return Err(ArcError::config("stream is empty"));
        }
        if !line.ends_with(b"\n") {
            return Err(ArcError::config("unterminated header line"));
        }
        let header = VersionBlockHeader::parse(&line)?;

        let mut body = vec![0; header.body_len];
        reader.read_exact(&mut body).await.map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => ArcError::config(format!(
                "stream ended before the declared {} bytes of version block",
                header.body_len
            )),
            _ => e.into(),
        })?;
        let version_block = header.with_body(&body)?;

        let codec = ArcRecordCodec::new(version_block.columns.clone());
        Ok(Self {
            frames: FramedRead::new(reader, codec),
            version_block,
            done: false,
        })
    }
}

impl<ReaderT> ArcReader<ReaderT> {
    pub fn version_block(&self) -> &VersionBlock {
        &self.version_block
    }
}

impl<ReaderT: AsyncBufRead> Stream for ArcReader<ReaderT> {
    type Item = Result<ArcRecord, ArcError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        let item = futures::ready!(this.frames.poll_next(cx));
        if !matches!(item, Some(Ok(_))) {
            *this.done = true;
        }
        Poll::Ready(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{ArcWriter, RecordHeader, WriterConfig, DEFAULT_COLUMNS};
    use futures::{StreamExt as _, TryStreamExt as _};
    use pretty_assertions::assert_eq;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    const VERSION_BODY: &str =
        "1 0 TestOrigin\nURL IP-address Archive-date Content-type Archive-length\n\n";

    fn fixture(records: &str) -> Vec<u8> {
        format!(
            "filedesc://test.arc 0.0.0.0 20200101000000 text/plain {}\n{VERSION_BODY}{records}",
            VERSION_BODY.len()
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn decode_single_record() {
        let bytes = fixture("http://example.com/ 1.2.3.4 20200101000100 text/html 5\nhello\n");
        let reader = ArcReader::new(bytes.as_slice()).await.unwrap();
        assert_eq!(reader.version_block().name, "filedesc://test.arc");
        assert_eq!(reader.version_block().origin_code, "TestOrigin");

        let records: Vec<ArcRecord> = reader.try_collect().await.unwrap();
        assert_eq!(records.len(), 1);
        let expected: RecordHeader = [
            ("URL", "http://example.com/"),
            ("IP-address", "1.2.3.4"),
            ("Archive-date", "20200101000100"),
            ("Content-type", "text/html"),
            ("Archive-length", "5"),
        ]
        .into_iter()
        .collect();
        assert_eq!(records[0].header, expected);
        assert_eq!(&records[0].payload[..], b"hello");
    }

    #[tokio::test]
    async fn empty_archive_is_empty_stream() {
        let bytes = fixture("");
        let records: Vec<ArcRecord> = ArcReader::new(bytes.as_slice())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_terminator_keeps_earlier_records() {
        let bytes = fixture(concat!(
            "http://a/ 1.2.3.4 20200101000100 text/html 5\nhello\n",
            "http://b/ 1.2.3.4 20200101000200 text/html 5\nworld!",
            "http://c/ 1.2.3.4 20200101000300 text/html 2\nok\n",
        ));
        let results: Vec<_> = ArcReader::new(bytes.as_slice())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(&results[0].as_ref().unwrap().payload[..], b"hello");
        match &results[1] {
            Err(ArcError::CorruptRecord { index, .. }) => assert_eq!(*index, 1),
            other => panic!("expected corrupt record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_payload_is_corrupt() {
        let bytes = fixture("http://a/ 1.2.3.4 20200101000100 text/html 50\nhello\n");
        let results: Vec<_> = ArcReader::new(bytes.as_slice())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap_err().is_corrupt_record());
    }

    #[tokio::test]
    async fn short_version_block_is_config_error() {
        let bytes = b"filedesc://test.arc 0.0.0.0 20200101000000 text/plain 500\n1 0 X\n";
        assert!(matches!(
            ArcReader::new(&bytes[..]).await,
            Err(ArcError::Config(_))
        ));
    }

    #[tokio::test]
    async fn empty_stream_is_config_error() {
        assert!(matches!(
            ArcReader::new(&b""[..]).await,
            Err(ArcError::Config(_))
        ));
    }

    #[derive(Debug, Clone)]
    struct Capture {
        url: String,
        address: String,
        date: String,
        content_type: String,
        payload: Vec<u8>,
    }

    fn token(g: &mut Gen) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789:/.-_?=&%";
        let len = usize::arbitrary(g) % 24;
        (0..len)
            .map(|_| char::from(*g.choose(ALPHABET).unwrap()))
            .collect()
    }

    impl Arbitrary for Capture {
        fn arbitrary(g: &mut Gen) -> Self {
            Capture {
                url: token(g),
                address: token(g),
                date: token(g),
                content_type: token(g),
                payload: Vec::arbitrary(g),
            }
        }
    }

    impl Capture {
        fn header(&self) -> RecordHeader {
            [
                ("URL", self.url.as_str()),
                ("IP-address", self.address.as_str()),
                ("Archive-date", self.date.as_str()),
                ("Content-type", self.content_type.as_str()),
            ]
            .into_iter()
            .collect()
        }
    }

    async fn round_trip(captures: Vec<Capture>) -> bool {
        let mut buffer = Vec::new();
        let mut writer = ArcWriter::new(&mut buffer, WriterConfig::default())
            .await
            .unwrap();
        for capture in &captures {
            writer
                .append(capture.header(), capture.payload.clone())
                .await
                .unwrap();
        }
        writer.finish().await.unwrap();

        let records: Vec<ArcRecord> = ArcReader::new(buffer.as_slice())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        records.len() == captures.len()
            && records.iter().zip(&captures).all(|(record, capture)| {
                let mut expected = capture.header();
                expected.insert("Archive-length", capture.payload.len().to_string());
                record.header == expected && record.payload[..] == capture.payload[..]
            })
    }

    #[quickcheck]
    fn write_then_read_reproduces_records(captures: Vec<Capture>) -> bool {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(round_trip(captures))
    }

    #[tokio::test]
    async fn custom_columns_round_trip() {
        let columns = vec!["URL".to_owned(), "Checksum".to_owned(), "Size".to_owned()];
        let mut buffer = Vec::new();
        let mut writer = ArcWriter::new(
            &mut buffer,
            WriterConfig {
                columns: columns.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let header: RecordHeader = [("URL", "http://a/"), ("Checksum", "abc"), ("Size", "77")]
            .into_iter()
            .collect();
        writer.append(header, &b"payload"[..]).await.unwrap();
        writer.finish().await.unwrap();

        let mut reader = ArcReader::new(buffer.as_slice()).await.unwrap();
        assert_eq!(reader.version_block().columns, columns);
        let record = reader.next().await.unwrap().unwrap();
        assert_eq!(record.header.get("Size"), Some("7"));
        assert_eq!(record.header.get("Checksum"), Some("abc"));
        assert!(reader.next().await.is_none());
        assert_eq!(
            DEFAULT_COLUMNS.len(),
            WriterConfig::default().columns.len()
        );
    }
}

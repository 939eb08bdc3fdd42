//! Byte stream -> [`LLMStream`] adapter built on [`IncrementalChunkParser`].

use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::chunk_parser::{IncrementalChunkParser, ParsedLine};
use crate::provider::{LLMError, LLMStream};
use crate::types::LLMChunk;

/// Convert a raw completion byte stream into an [`LLMStream`].
///
/// The resulting stream yields one `Token` per text delta and a final `Done` when the
/// `[DONE]` sentinel arrives. If the upstream simply ends without the sentinel the stream
/// ends without `Done`; callers decide whether that counts as success.
pub fn llm_stream_from_bytes<S, E>(bytes: S) -> LLMStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut parser = IncrementalChunkParser::new();
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    yield Err(LLMError::Stream(error.to_string()));
                    return;
                }
            };

            for line in parser.feed(&chunk) {
                match line {
                    ParsedLine::Delta(text) => yield Ok(LLMChunk::Token(text)),
                    ParsedLine::Done => {
                        yield Ok(LLMChunk::Done);
                        return;
                    }
                }
            }
        }

        for line in parser.finish() {
            match line {
                ParsedLine::Delta(text) => yield Ok(LLMChunk::Token(text)),
                ParsedLine::Done => yield Ok(LLMChunk::Done),
            }
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(chunks: Vec<std::result::Result<&'static str, &'static str>>) -> Vec<String> {
        let source = stream::iter(
            chunks
                .into_iter()
                .map(|chunk| chunk.map(|text| Bytes::from_static(text.as_bytes()))),
        );
        let mut out = Vec::new();
        let mut llm_stream = llm_stream_from_bytes(source);
        while let Some(item) = llm_stream.next().await {
            out.push(match item {
                Ok(LLMChunk::Token(token)) => format!("token:{token}"),
                Ok(LLMChunk::Done) => "done".to_string(),
                Err(error) => format!("error:{error}"),
            });
        }
        out
    }

    #[tokio::test]
    async fn yields_tokens_then_done() {
        let out = collect(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\ndata: [DONE]\n\n"),
        ])
        .await;

        assert_eq!(out, vec!["token:Hi", "token: there", "done"]);
    }

    #[tokio::test]
    async fn ends_without_done_when_sentinel_missing() {
        let out = collect(vec![Ok(
            "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n",
        )])
        .await;

        assert_eq!(out, vec!["token:partial"]);
    }

    #[tokio::test]
    async fn transport_error_becomes_stream_error() {
        let out = collect(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n"),
            Err("connection reset"),
        ])
        .await;

        assert_eq!(out, vec!["token:a", "error:Stream error: connection reset"]);
    }
}

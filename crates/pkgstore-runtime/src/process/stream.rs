//! Async pipe readers that forward output as text chunks.
//!
//! Reads are forwarded as soon as they return rather than per line: apt
//! draws progress with `\r` and may not print a newline for a while. Bytes
//! are decoded lossily, so non-UTF-8 output never stops a reader, and a
//! multi-byte character split across two reads is carried over instead of
//! being replaced.

use pkgstore_core::{OutputChunk, OutputStream};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Longest possible UTF-8 sequence; a carry never exceeds this minus one.
const MAX_UTF8_SEQUENCE: usize = 4;

/// Forward `pipe` to `sink` until EOF. Aborting the task closes the pipe.
pub fn spawn_chunk_reader(
    pipe: impl AsyncRead + Unpin + Send + 'static,
    stream: OutputStream,
    sink: mpsc::Sender<OutputChunk>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = pipe;
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut decoder = ChunkDecoder::default();

        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    let text = decoder.decode(&buf[..n]);
                    if text.is_empty() {
                        continue;
                    }
                    if sink.send(OutputChunk { stream, text }).await.is_err() {
                        debug!(stream = stream.as_str(), "chunk receiver dropped, reader exiting");
                        return;
                    }
                }
                Err(e) => {
                    debug!(stream = stream.as_str(), error = %e, "pipe reader exiting due to read error");
                    break;
                }
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = sink.send(OutputChunk { stream, text: rest }).await;
        }
        debug!(stream = stream.as_str(), "pipe reader task exiting");
    })
}

/// Lossy UTF-8 decoder that holds back an incomplete trailing sequence.
#[derive(Debug, Default)]
pub(crate) struct ChunkDecoder {
    carry: Vec<u8>,
}

impl ChunkDecoder {
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);

        let keep = match std::str::from_utf8(&self.carry) {
            Ok(_) => 0,
            Err(e) if e.error_len().is_none() => self.carry.len() - e.valid_up_to(),
            Err(_) => incomplete_suffix_len(&self.carry),
        };

        let split = self.carry.len() - keep;
        let text = String::from_utf8_lossy(&self.carry[..split]).into_owned();
        self.carry.drain(..split);
        text
    }

    /// Flush whatever is left once the pipe closes.
    pub(crate) fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        text
    }
}

/// Length of a truncated multi-byte sequence at the very end of `bytes`.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    let tail_start = bytes.len().saturating_sub(MAX_UTF8_SEQUENCE - 1);
    for start in (tail_start..bytes.len()).rev() {
        let byte = bytes[start];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue; // continuation byte, keep looking for the lead
        }
        let needed = match byte {
            b if b & 0b1110_0000 == 0b1100_0000 => 2,
            b if b & 0b1111_0000 == 0b1110_0000 => 3,
            b if b & 0b1111_1000 == 0b1111_0000 => 4,
            _ => return 0,
        };
        let have = bytes.len() - start;
        return if have < needed { have } else { 0 };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_straight_through() {
        let mut decoder = ChunkDecoder::default();
        assert_eq!(decoder.decode(b"Get:1 http://mirror\n"), "Get:1 http://mirror\n");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn split_multibyte_character_is_reassembled() {
        let bytes = "déjà vu".as_bytes();
        let mut decoder = ChunkDecoder::default();
        // Split inside the two-byte 'é'.
        let first = decoder.decode(&bytes[..2]);
        let second = decoder.decode(&bytes[2..]);
        assert_eq!(first, "d");
        assert_eq!(format!("{first}{second}"), "déjà vu");
    }

    #[test]
    fn invalid_bytes_are_replaced_not_fatal() {
        let mut decoder = ChunkDecoder::default();
        let text = decoder.decode(b"ok \xff\xfe done");
        assert!(text.starts_with("ok "));
        assert!(text.ends_with(" done"));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn invalid_then_truncated_sequence_holds_back_only_the_tail() {
        let mut decoder = ChunkDecoder::default();
        // Invalid byte followed by the first byte of a three-byte char.
        let text = decoder.decode(b"a\xffb\xe2\x82");
        assert_eq!(text, "a\u{fffd}b");
        assert_eq!(decoder.decode(b"\xac"), "\u{20ac}");
    }

    #[test]
    fn truncated_tail_is_flushed_on_finish() {
        let mut decoder = ChunkDecoder::default();
        assert_eq!(decoder.decode(b"x\xe2\x82"), "x");
        assert_eq!(decoder.finish(), "\u{fffd}");
    }

    #[tokio::test]
    async fn reader_forwards_chunks_and_closes() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_chunk_reader(&b"Unpacking htop\n"[..], OutputStream::Stdout, tx);

        let chunk = rx.recv().await.unwrap();
        assert_eq!(chunk, OutputChunk::stdout("Unpacking htop\n"));
        assert!(rx.recv().await.is_none());
    }
}

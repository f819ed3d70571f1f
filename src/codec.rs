use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Frame decoder that re-encodes a legacy charset (e.g. windows-1251 exports
/// of the stock sheet) into UTF-8 chunks.
pub struct CharsetTranscoder {
    decoder: encoding_rs::Decoder,
}

impl CharsetTranscoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
        }
    }

    /// Decodes as much of `src` as fits; returns bytes consumed and the UTF-8 output.
    fn decode_chunk(&mut self, src: &[u8], last: bool) -> (usize, BytesMut) {
        let max = if last {
            self.decoder.max_utf8_buffer_length(src.len())
        } else {
            self.decoder
                .max_utf8_buffer_length_without_replacement(src.len())
        };

        let mut out = vec![0; max.unwrap_or(src.len() * 3)];
        let (_result, read, written, _had_errors) = self.decoder.decode_to_utf8(src, &mut out, last);
        out.truncate(written);
        (read, BytesMut::from(&out[..]))
    }
}

impl Decoder for CharsetTranscoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let (read, out) = self.decode_chunk(src, false);
        if read == 0 && out.is_empty() {
            return Ok(None);
        }

        src.advance(read);
        Ok(Some(out))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }

        let (_read, out) = self.decode_chunk(buf, true);
        buf.clear();

        if out.is_empty() {
            Ok(None)
        } else {
            Ok(Some(out))
        }
    }
}

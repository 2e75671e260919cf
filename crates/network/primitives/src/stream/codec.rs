#[cfg(test)]
#[path = "../tests/codec.rs"]
mod tests;

use std::borrow::Cow;
use std::io::Error as IoError;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// One application payload, carried verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Message<'a> {
    pub data: Cow<'a, [u8]>,
}

impl<'a> Message<'a> {
    #[must_use]
    pub fn new(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self { data: data.into() }
    }

    #[must_use]
    pub fn into_owned(self) -> Message<'static> {
        Message {
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
#[non_exhaustive]
pub struct CodecError(#[from] IoError);

#[derive(Debug)]
pub struct MessageCodec {
    length_codec: LengthDelimitedCodec,
}

impl MessageCodec {
    #[must_use]
    pub fn new(max_message_size: usize) -> Self {
        Self {
            length_codec: LengthDelimitedCodec::builder()
                .max_frame_length(max_message_size)
                .new_codec(),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Message<'static>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame) = self.length_codec.decode(src)? else {
            return Ok(None);
        };

        Ok(Some(Message::new(frame.to_vec())))
    }
}

impl<'a> Encoder<Message<'a>> for MessageCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message<'a>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let frame = match item.data {
            Cow::Borrowed(data) => Bytes::copy_from_slice(data),
            Cow::Owned(data) => Bytes::from(data),
        };

        self.length_codec.encode(frame, dst).map_err(CodecError)
    }
}

#[cfg(test)]
#[path = "tests/stream.rs"]
mod tests;

use core::fmt::{self, Debug, Formatter};
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_util::io::{AsyncRead, AsyncWrite};
use futures_util::{Sink, Stream as FuturesStream};
use libp2p::{PeerId, Stream as P2pStream, StreamProtocol};
use tokio_util::codec::Framed;
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};

mod codec;

use codec::MessageCodec;
pub use codec::{CodecError, Message};

pub const MAX_MESSAGE_SIZE: usize = 8 * 1_024 * 1_024;

pub const SWARMGATE_STREAM_PROTOCOL: StreamProtocol =
    StreamProtocol::new("/swarmgate/stream/0.0.1");

/// Application messages exchanged with one peer.
///
/// Each message travels as a single length-prefixed frame of at most
/// [`MAX_MESSAGE_SIZE`] bytes. The underlying substream already runs inside
/// the gated, authenticated connection to `peer_id`.
pub struct Stream<S = P2pStream> {
    peer_id: PeerId,
    frames: Framed<Compat<S>, MessageCodec>,
}

impl<S: AsyncRead + AsyncWrite> Stream<S> {
    #[must_use]
    pub fn new(peer_id: PeerId, io: S) -> Self {
        Self {
            peer_id,
            frames: Framed::new(io.compat(), MessageCodec::new(MAX_MESSAGE_SIZE)),
        }
    }
}

impl<S> Stream<S> {
    /// Remote end of this stream.
    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    fn frames(self: Pin<&mut Self>) -> Pin<&mut Framed<Compat<S>, MessageCodec>>
    where
        S: Unpin,
    {
        Pin::new(&mut self.get_mut().frames)
    }
}

impl<S> Debug for Stream<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> FuturesStream for Stream<S> {
    type Item = Result<Message<'static>, CodecError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        FuturesStream::poll_next(self.frames(), cx)
    }
}

impl<'a, S: AsyncRead + AsyncWrite + Unpin> Sink<Message<'a>> for Stream<S> {
    type Error = CodecError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), CodecError>> {
        Sink::<Message<'a>>::poll_ready(self.frames(), cx)
    }

    fn start_send(self: Pin<&mut Self>, message: Message<'a>) -> Result<(), CodecError> {
        Sink::<Message<'a>>::start_send(self.frames(), message)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), CodecError>> {
        Sink::<Message<'a>>::poll_flush(self.frames(), cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), CodecError>> {
        Sink::<Message<'a>>::poll_close(self.frames(), cx)
    }
}

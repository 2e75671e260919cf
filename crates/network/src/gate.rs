#[cfg(test)]
#[path = "tests/gate.rs"]
mod tests;

use core::fmt::{self, Debug, Formatter};
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::sync::Arc;

use futures_util::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use rand::rngs::OsRng;
use rand::RngCore;
use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::XSalsa20;
use swarmgate_network_primitives::psk::PreSharedKey;
use thiserror::Error;
use tracing::{debug, trace};

pub const NONCE_LEN: usize = 24;

/// Ciphertext held back until it has been fully handed to the socket.
const WRITE_BUFFER_SIZE: usize = 8 * 1_024;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    #[error("nonce exchange failed")]
    Handshake(#[source] IoError),
}

/// Installs the private-network layer on raw connections.
///
/// Cloning is cheap, every clone shares the same key.
#[derive(Clone)]
pub struct GateConfig {
    psk: Arc<PreSharedKey>,
}

impl GateConfig {
    #[must_use]
    pub const fn new(psk: Arc<PreSharedKey>) -> Self {
        Self { psk }
    }

    /// Exchanges nonces over `socket` and wraps it in a [`GatedStream`].
    ///
    /// The local nonce is written and flushed before the remote one is read,
    /// so both ends may run this concurrently without agreeing on roles.
    pub async fn handshake<S>(self, mut socket: S) -> Result<GatedStream<S>, GateError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let mut local_nonce = [0_u8; NONCE_LEN];
        OsRng.fill_bytes(&mut local_nonce);

        socket
            .write_all(&local_nonce)
            .await
            .map_err(GateError::Handshake)?;
        socket.flush().await.map_err(GateError::Handshake)?;

        let mut remote_nonce = [0_u8; NONCE_LEN];
        socket
            .read_exact(&mut remote_nonce)
            .await
            .map_err(GateError::Handshake)?;

        debug!(fingerprint=%self.psk.fingerprint(), "Gate established");

        Ok(GatedStream::new(
            socket,
            &self.psk,
            &local_nonce,
            &remote_nonce,
        ))
    }
}

impl Debug for GateConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("fingerprint", &self.psk.fingerprint())
            .finish()
    }
}

/// First `len` bytes of the XSalsa20 keystream for `psk` and `nonce`.
#[must_use]
pub fn derive_keystream(psk: &PreSharedKey, nonce: &[u8; NONCE_LEN], len: usize) -> Vec<u8> {
    let mut keystream = vec![0_u8; len];
    cipher(psk, nonce).apply_keystream(&mut keystream);
    keystream
}

fn cipher(psk: &PreSharedKey, nonce: &[u8; NONCE_LEN]) -> XSalsa20 {
    XSalsa20::new(psk.as_bytes().into(), nonce.into())
}

/// A raw connection whose bytes are XORed with per-direction keystreams.
///
/// Nothing authenticates the traffic. A peer with another key simply reads
/// noise and the layers above fail to negotiate.
pub struct GatedStream<S> {
    inner: S,
    send: XSalsa20,
    recv: XSalsa20,
    pending: Vec<u8>,
}

impl<S> GatedStream<S> {
    fn new(
        inner: S,
        psk: &PreSharedKey,
        local_nonce: &[u8; NONCE_LEN],
        remote_nonce: &[u8; NONCE_LEN],
    ) -> Self {
        Self {
            inner,
            send: cipher(psk, local_nonce),
            recv: cipher(psk, remote_nonce),
            pending: Vec::with_capacity(WRITE_BUFFER_SIZE),
        }
    }
}

impl<S: AsyncWrite + Unpin> GatedStream<S> {
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        while !self.pending.is_empty() {
            let written = ready!(Pin::new(&mut self.inner).poll_write(cx, &self.pending))?;

            if written == 0 {
                return Poll::Ready(Err(IoError::new(
                    ErrorKind::WriteZero,
                    "gated socket refused buffered ciphertext",
                )));
            }

            trace!(written, "Drained gated ciphertext");

            drop(self.pending.drain(..written));
        }

        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for GatedStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<IoResult<usize>> {
        let this = self.get_mut();

        let read = ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.recv.apply_keystream(&mut buf[..read]);

        Poll::Ready(Ok(read))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for GatedStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<IoResult<usize>> {
        let this = self.get_mut();

        if this.pending.len() >= WRITE_BUFFER_SIZE {
            ready!(this.poll_drain(cx))?;
        }

        let accepted = buf
            .len()
            .min(WRITE_BUFFER_SIZE.saturating_sub(this.pending.len()));
        let start = this.pending.len();

        this.pending.extend_from_slice(&buf[..accepted]);
        this.send.apply_keystream(&mut this.pending[start..]);

        Poll::Ready(Ok(accepted))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        let this = self.get_mut();

        ready!(this.poll_drain(cx))?;

        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        let this = self.get_mut();

        ready!(this.poll_drain(cx))?;

        Pin::new(&mut this.inner).poll_close(cx)
    }
}

impl<S: Debug> Debug for GatedStream<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedStream")
            .field("inner", &self.inner)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

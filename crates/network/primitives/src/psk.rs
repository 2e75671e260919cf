#[cfg(test)]
#[path = "tests/psk.rs"]
mod tests;

use core::fmt::{self, Debug, Display, Formatter};
use core::str::{from_utf8, FromStr};
use std::fs::{read, remove_file, rename, OpenOptions};
use std::io::{Error as IoError, ErrorKind, Write};
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const KEY_LEN: usize = 32;
pub const FINGERPRINT_LEN: usize = 16;

pub const KEY_FILE_VERSION: &str = "1.0.0";
pub const KEY_FILE_HEADER: &str = "/key/swarm/psk/1.0.0/";
pub const KEY_FILE_ENCODING: &str = "/base16/";

const KEY_FILE_PREFIX: &str = "/key/swarm/psk/";
const FINGERPRINT_DOMAIN: &[u8] = b"/swarmgate/psk/fingerprint/1";

/// Errors raised while loading or storing a swarm key file.
///
/// Variants carry the offending path but never any key material.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PskError {
    #[error("failed to access swarm key file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("malformed swarm key file {path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: KeyFormatError,
    },
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyFormatError {
    #[error("content is not valid UTF-8")]
    NotUtf8,
    #[error("missing swarm key header")]
    MissingHeader,
    #[error("expected a `/key/swarm/psk/<version>/` header")]
    InvalidHeader,
    #[error("unsupported swarm key version, expected 1.0.0")]
    UnsupportedVersion,
    #[error("missing encoding line")]
    MissingEncoding,
    #[error("unsupported key encoding, expected `/base16/`")]
    UnsupportedEncoding,
    #[error("missing encoded key")]
    MissingKey,
    #[error("encoded key is not valid base16")]
    InvalidHex,
    #[error("expected a {expected} byte key, got {actual} bytes")]
    InvalidLength { expected: usize, actual: usize },
    #[error("unexpected data after the encoded key")]
    TrailingData,
}

/// A pre-shared key partitioning a private network.
///
/// The key is zeroed on drop and its `Debug` output only shows the
/// [`Fingerprint`].
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PreSharedKey([u8; KEY_LEN]);

impl PreSharedKey {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyFormatError> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| KeyFormatError::InvalidLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;

        Ok(Self(key))
    }

    /// Generates a fresh key from the operating system's CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0_u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let digest = Sha256::new()
            .chain_update(FINGERPRINT_DOMAIN)
            .chain_update(self.0)
            .finalize();

        let mut fingerprint = [0_u8; FINGERPRINT_LEN];
        fingerprint.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Fingerprint(fingerprint)
    }

    /// Reads and validates a swarm key file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PskError> {
        let path = path.as_ref();

        let content = Zeroizing::new(read(path).map_err(|source| PskError::Io {
            path: path.to_owned(),
            source,
        })?);

        Self::decode_key_file(&content).map_err(|source| PskError::Format {
            path: path.to_owned(),
            source,
        })
    }

    /// Writes the key file, refusing to replace an existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PskError> {
        let path = path.as_ref();
        let io_error = |source: IoError| PskError::Io {
            path: path.to_owned(),
            source,
        };

        let mut options = OpenOptions::new();
        let _ = options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;

            let _ = options.mode(0o600);
        }

        let mut file = options.open(path).map_err(io_error)?;

        file.write_all(self.encode_key_file().as_bytes())
            .map_err(io_error)?;

        file.sync_all().map_err(io_error)
    }

    /// Writes the key file, atomically replacing any existing one.
    ///
    /// The key is staged in `<path>.tmp` and renamed over `path`.
    pub fn replace(&self, path: impl AsRef<Path>) -> Result<(), PskError> {
        let path = path.as_ref();

        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        match remove_file(&staging) {
            Err(source) if source.kind() != ErrorKind::NotFound => {
                return Err(PskError::Io {
                    path: staging,
                    source,
                });
            }
            _ => {}
        }

        self.save(&staging)?;

        rename(&staging, path).map_err(|source| PskError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Parses `/key/swarm/psk/1.0.0/`, `/base16/`, `<hex>`, one per line.
    pub fn decode_key_file(content: &[u8]) -> Result<Self, KeyFormatError> {
        let content = from_utf8(content).map_err(|_| KeyFormatError::NotUtf8)?;
        let mut lines = content.lines();

        let header = lines.next().ok_or(KeyFormatError::MissingHeader)?;
        let version = header
            .strip_prefix(KEY_FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix('/'))
            .ok_or(KeyFormatError::InvalidHeader)?;
        if version != KEY_FILE_VERSION {
            return Err(KeyFormatError::UnsupportedVersion);
        }

        let encoding = lines.next().ok_or(KeyFormatError::MissingEncoding)?;
        if encoding != KEY_FILE_ENCODING {
            return Err(KeyFormatError::UnsupportedEncoding);
        }

        let encoded = lines.next().ok_or(KeyFormatError::MissingKey)?;
        if lines.next().is_some() {
            return Err(KeyFormatError::TrailingData);
        }

        let decoded =
            Zeroizing::new(hex::decode(encoded).map_err(|_| KeyFormatError::InvalidHex)?);

        Self::from_slice(&decoded)
    }

    #[must_use]
    pub fn encode_key_file(&self) -> Zeroizing<String> {
        let encoded = Zeroizing::new(hex::encode(self.0));

        Zeroizing::new(format!(
            "{KEY_FILE_HEADER}\n{KEY_FILE_ENCODING}\n{}\n",
            encoded.as_str()
        ))
    }
}

impl FromStr for PreSharedKey {
    type Err = KeyFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode_key_file(s.as_bytes())
    }
}

impl Debug for PreSharedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreSharedKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// One-way digest of a [`PreSharedKey`], safe to log and compare.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint")
            .field(&format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;

use std::fs::{read_to_string, write};

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result as EyreResult, WrapErr};
use libp2p_identity::Keypair;
use serde::{Deserialize, Serialize};
use swarmgate_network_primitives::config::{HostOptions, NetworkConfig, SwarmConfig};
use swarmgate_network_primitives::psk::PreSharedKey;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ConfigFile {
    /// Swarm key file; relative paths resolve against the node directory.
    /// Absent means the node joins the open network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_key: Option<Utf8PathBuf>,

    #[serde(with = "serde_identity")]
    pub identity: Keypair,

    pub swarm: SwarmConfig,

    #[serde(default)]
    pub host: HostOptions,
}

impl ConfigFile {
    #[must_use]
    pub const fn new(
        identity: Keypair,
        swarm: SwarmConfig,
        host: HostOptions,
        swarm_key: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            swarm_key,
            identity,
            swarm,
            host,
        }
    }

    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path:?}"))?;

        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse configuration at {path:?}"))
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path:?}"))?;

        Ok(())
    }

    /// Where the swarm key lives, if the node is part of a private network.
    #[must_use]
    pub fn swarm_key_path(&self, dir: &Utf8Path) -> Option<Utf8PathBuf> {
        self.swarm_key.as_ref().map(|path| dir.join(path))
    }

    pub fn load_swarm_key(&self, dir: &Utf8Path) -> EyreResult<Option<PreSharedKey>> {
        let Some(path) = self.swarm_key_path(dir) else {
            return Ok(None);
        };

        let psk = PreSharedKey::load(&path)?;

        Ok(Some(psk))
    }

    #[must_use]
    pub fn into_network_config(self) -> NetworkConfig {
        NetworkConfig::new(self.identity, self.swarm, self.host)
    }
}

pub mod serde_identity {
    use core::fmt::{self, Formatter};

    use libp2p_identity::{Keypair, PeerId};
    use serde::de::{self, MapAccess};
    use serde::ser::{self, SerializeMap};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(key: &Keypair, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut keypair = serializer.serialize_map(Some(2))?;
        keypair.serialize_entry("peer_id", &key.public().to_peer_id().to_base58())?;
        keypair.serialize_entry(
            "keypair",
            &bs58::encode(&key.to_protobuf_encoding().map_err(ser::Error::custom)?).into_string(),
        )?;
        keypair.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Keypair, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdentityVisitor;

        impl<'de> de::Visitor<'de> for IdentityVisitor {
            type Value = Keypair;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("an identity")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut peer_id = None::<String>;
                let mut priv_key = None::<String>;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "peer_id" => peer_id = Some(map.next_value()?),
                        "keypair" => priv_key = Some(map.next_value()?),
                        _ => {
                            let _ignored = map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                let peer_id = peer_id.ok_or_else(|| de::Error::missing_field("peer_id"))?;
                let priv_key = priv_key.ok_or_else(|| de::Error::missing_field("keypair"))?;

                let decoded_priv_key = bs58::decode(&priv_key)
                    .into_vec()
                    .map_err(de::Error::custom)?;

                let keypair = Keypair::from_protobuf_encoding(&decoded_priv_key)
                    .map_err(de::Error::custom)?;

                let expected = peer_id.parse::<PeerId>().map_err(de::Error::custom)?;
                if keypair.public().to_peer_id() != expected {
                    return Err(de::Error::custom(format!(
                        "keypair does not belong to peer {expected}"
                    )));
                }

                Ok(keypair)
            }
        }

        deserializer.deserialize_map(IdentityVisitor)
    }
}

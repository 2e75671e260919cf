use std::fs::{create_dir, create_dir_all};

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use eyre::{bail, Result as EyreResult, WrapErr};
use libp2p_identity::Keypair;
use multiaddr::{Multiaddr, Protocol};
use swarmgate_config::ConfigFile;
use swarmgate_network::primitives::config::{HostOptions, SwarmConfig, DEFAULT_PORT};
use swarmgate_network::primitives::psk::PreSharedKey;
use tracing::{info, warn};

use crate::cli::RootArgs;
use crate::defaults::{self, DEFAULT_SWARM_KEY_FILE};

/// Initialize node configuration
#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("network").args(["swarm_key", "generate_swarm_key"])))]
pub struct InitCommand {
    /// Swarm key gating every connection of this node
    #[arg(long, value_name = "PATH")]
    pub swarm_key: Option<Utf8PathBuf>,

    /// Generate a fresh swarm key next to the node configuration
    #[arg(long)]
    pub generate_swarm_key: bool,

    /// Port to listen on
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Disable hole punching of relayed connections
    #[arg(long)]
    pub no_hole_punching: bool,

    /// Force initialization even if the directory already exists
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let path = root_args.node_dir();

        if !path.exists() {
            if root_args.home == defaults::default_node_dir() {
                create_dir_all(&path)
            } else {
                create_dir(&path)
            }
            .wrap_err_with(|| format!("failed to create directory {path:?}"))?;
        }

        if ConfigFile::exists(&path) {
            if let Err(err) = ConfigFile::load(&path) {
                if self.force {
                    warn!(
                        "Failed to load existing configuration, overwriting: {}",
                        err
                    );
                } else {
                    bail!("failed to load existing configuration: {}", err);
                }
            }
            if !self.force {
                bail!("Node is already initialized in {:?}", path);
            }
        }

        let swarm_key = if self.generate_swarm_key {
            let key_path = path.join(DEFAULT_SWARM_KEY_FILE);
            let psk = PreSharedKey::generate();

            if self.force {
                psk.replace(&key_path)?;
            } else {
                psk.save(&key_path)?;
            }

            info!(fingerprint=%psk.fingerprint(), "Generated swarm key at {:?}", key_path);

            Some(Utf8PathBuf::from(DEFAULT_SWARM_KEY_FILE))
        } else if let Some(key_path) = self.swarm_key {
            let key_path = key_path
                .canonicalize_utf8()
                .wrap_err_with(|| format!("failed to resolve swarm key path {key_path:?}"))?;
            let psk = PreSharedKey::load(&key_path)?;

            info!(fingerprint=%psk.fingerprint(), "Using swarm key at {:?}", key_path);

            Some(key_path)
        } else {
            None
        };

        let identity = Keypair::generate_ed25519();
        info!("Generated identity: {:?}", identity.public().to_peer_id());

        let listen = [
            Protocol::Ip4([0, 0, 0, 0].into()),
            Protocol::Ip6([0; 16].into()),
        ]
        .into_iter()
        .map(|ip| Multiaddr::empty().with(ip).with(Protocol::Tcp(self.port)))
        .collect();

        let config = ConfigFile::new(
            identity,
            SwarmConfig::new(listen),
            HostOptions::default().with_hole_punching(!self.no_hole_punching),
            swarm_key,
        );

        config.save(&path)?;

        info!("Initialized a node in {:?}", path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use tempdir::TempDir;

    use super::*;

    fn root_args(home: &TempDir) -> RootArgs {
        let home = Utf8Path::from_path(home.path()).unwrap();

        RootArgs::parse_from(["swarmgated", "--home", home.as_str(), "-n", "node1"])
    }

    fn init(args: &[&str]) -> InitCommand {
        InitCommand::parse_from(["init"].iter().chain(args))
    }

    #[test]
    fn test_force_replaces_generated_swarm_key() {
        let home = TempDir::new("swarmgated").unwrap();
        let root = root_args(&home);
        let node_dir = root.node_dir();
        let key_path = node_dir.join(DEFAULT_SWARM_KEY_FILE);

        init(&["--generate-swarm-key"]).run(&root).unwrap();
        let first = PreSharedKey::load(&key_path).unwrap();

        assert!(init(&["--generate-swarm-key"]).run(&root).is_err());

        init(&["--generate-swarm-key", "--force"]).run(&root).unwrap();
        let second = PreSharedKey::load(&key_path).unwrap();

        assert_ne!(first, second);

        let config = ConfigFile::load(&node_dir).unwrap();
        assert_eq!(config.load_swarm_key(&node_dir).unwrap(), Some(second));
    }

    #[test]
    fn test_force_switches_to_open_network() {
        let home = TempDir::new("swarmgated").unwrap();
        let root = root_args(&home);
        let node_dir = root.node_dir();

        init(&["--generate-swarm-key"]).run(&root).unwrap();
        init(&["--force"]).run(&root).unwrap();

        let config = ConfigFile::load(&node_dir).unwrap();
        assert!(config.load_swarm_key(&node_dir).unwrap().is_none());
    }
}

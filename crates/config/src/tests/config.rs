use core::time::Duration;
use std::fs::write;

use swarmgate_network_primitives::config::{HostOptions, SwarmConfig};
use tempdir::TempDir;

use super::*;

fn dir(tmp: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(tmp.path()).unwrap()
}

#[test]
fn test_round_trip() {
    let tmp = TempDir::new("swarmgate-config").unwrap();
    let identity = Keypair::generate_ed25519();
    let peer_id = identity.public().to_peer_id();

    let config = ConfigFile::new(
        identity,
        SwarmConfig::new(vec!["/ip4/0.0.0.0/tcp/4242".parse().unwrap()]),
        HostOptions::default()
            .with_hole_punching(false)
            .with_handshake_timeout(Duration::from_millis(2_500)),
        Some("swarm.key".into()),
    );

    assert!(!ConfigFile::exists(dir(&tmp)));
    config.save(dir(&tmp)).unwrap();
    assert!(ConfigFile::exists(dir(&tmp)));

    let loaded = ConfigFile::load(dir(&tmp)).unwrap();

    assert_eq!(loaded.identity.public().to_peer_id(), peer_id);
    assert_eq!(loaded.swarm.listen, config.swarm.listen);
    assert_eq!(loaded.host, config.host);
    assert_eq!(loaded.swarm_key.as_deref(), Some(Utf8Path::new("swarm.key")));
}

#[test]
fn test_open_network_omits_swarm_key() {
    let tmp = TempDir::new("swarmgate-config").unwrap();

    let config = ConfigFile::new(
        Keypair::generate_ed25519(),
        SwarmConfig::loopback(),
        HostOptions::default(),
        None,
    );
    config.save(dir(&tmp)).unwrap();

    let content = std::fs::read_to_string(dir(&tmp).join(CONFIG_FILE)).unwrap();
    assert!(!content.contains("swarm_key"));

    let loaded = ConfigFile::load(dir(&tmp)).unwrap();
    assert!(loaded.swarm_key.is_none());
    assert!(loaded.load_swarm_key(dir(&tmp)).unwrap().is_none());
}

#[test]
fn test_host_options_default_when_absent() {
    let tmp = TempDir::new("swarmgate-config").unwrap();
    let identity = Keypair::generate_ed25519();

    let content = format!(
        "[identity]\npeer_id = \"{}\"\nkeypair = \"{}\"\n\n[swarm]\nlisten = [\"/ip4/127.0.0.1/tcp/0\"]\n",
        identity.public().to_peer_id(),
        bs58::encode(identity.to_protobuf_encoding().unwrap()).into_string(),
    );
    write(dir(&tmp).join(CONFIG_FILE), content).unwrap();

    let loaded = ConfigFile::load(dir(&tmp)).unwrap();

    assert_eq!(loaded.host, HostOptions::default());
    assert!(loaded.host.hole_punching);
}

#[test]
fn test_relative_swarm_key_resolves_against_node_dir() {
    let tmp = TempDir::new("swarmgate-config").unwrap();
    let psk = PreSharedKey::generate();
    psk.save(dir(&tmp).join("swarm.key")).unwrap();

    let config = ConfigFile::new(
        Keypair::generate_ed25519(),
        SwarmConfig::loopback(),
        HostOptions::default(),
        Some("swarm.key".into()),
    );

    assert_eq!(
        config.swarm_key_path(dir(&tmp)),
        Some(dir(&tmp).join("swarm.key"))
    );
    assert_eq!(config.load_swarm_key(dir(&tmp)).unwrap(), Some(psk));
}

#[test]
fn test_missing_swarm_key_is_an_error() {
    let tmp = TempDir::new("swarmgate-config").unwrap();

    let config = ConfigFile::new(
        Keypair::generate_ed25519(),
        SwarmConfig::loopback(),
        HostOptions::default(),
        Some("missing.key".into()),
    );

    assert!(config.load_swarm_key(dir(&tmp)).is_err());
}

#[test]
fn test_identity_must_match_peer_id() {
    let tmp = TempDir::new("swarmgate-config").unwrap();
    let identity = Keypair::generate_ed25519();
    let other = Keypair::generate_ed25519();

    let content = format!(
        "[identity]\npeer_id = \"{}\"\nkeypair = \"{}\"\n\n[swarm]\nlisten = []\n",
        other.public().to_peer_id(),
        bs58::encode(identity.to_protobuf_encoding().unwrap()).into_string(),
    );
    write(dir(&tmp).join(CONFIG_FILE), content).unwrap();

    assert!(ConfigFile::load(dir(&tmp)).is_err());
}

#[test]
fn test_load_missing_config() {
    let tmp = TempDir::new("swarmgate-config").unwrap();

    assert!(ConfigFile::load(dir(&tmp)).is_err());
}

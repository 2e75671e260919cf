use camino::{Utf8Path, Utf8PathBuf};
use dirs::home_dir;

pub const DEFAULT_SWARMGATE_HOME: &str = ".swarmgate";

/// Name of the swarm key written next to `config.toml` by `init --generate-swarm-key`.
pub const DEFAULT_SWARM_KEY_FILE: &str = "swarm.key";

pub fn default_node_dir() -> Utf8PathBuf {
    if let Some(home) = home_dir().as_deref().and_then(Utf8Path::from_path) {
        return home.join(DEFAULT_SWARMGATE_HOME);
    }

    Utf8PathBuf::default()
}

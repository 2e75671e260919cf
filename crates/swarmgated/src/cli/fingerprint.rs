use camino::Utf8PathBuf;
use clap::Parser;
use eyre::Result as EyreResult;
use swarmgate_network::primitives::psk::PreSharedKey;

/// Print the fingerprint of a swarm key file
#[derive(Debug, Parser)]
pub struct FingerprintCommand {
    #[arg(value_name = "PATH")]
    pub path: Utf8PathBuf,
}

impl FingerprintCommand {
    pub fn run(self) -> EyreResult<()> {
        let psk = PreSharedKey::load(&self.path)?;

        println!("{}", psk.fingerprint());

        Ok(())
    }
}

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::Result as EyreResult;
use swarmgate_network::primitives::psk::PreSharedKey;

/// Generate a new swarm key file
#[derive(Debug, Parser)]
pub struct KeygenCommand {
    /// Where to write the key; an existing file is never replaced
    #[arg(short, long, value_name = "PATH")]
    pub output: Utf8PathBuf,
}

impl KeygenCommand {
    pub fn run(self) -> EyreResult<()> {
        let psk = PreSharedKey::generate();

        psk.save(&self.output)?;

        println!("Wrote swarm key to {}", self.output);
        println!("Fingerprint: {}", psk.fingerprint());

        Ok(())
    }
}

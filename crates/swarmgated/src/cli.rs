use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::Result as EyreResult;

use crate::defaults;

mod fingerprint;
mod init;
mod keygen;
mod run;

use fingerprint::FingerprintCommand;
use init::InitCommand;
use keygen::KeygenCommand;
use run::RunCommand;

pub const EXAMPLES: &str = r"
  # Create a swarm key to share with every member of the network
  $ swarmgated keygen --output swarm.key

  # Initialize a node that only talks to holders of that key
  $ swarmgated --home data/ --node-name node1 init --swarm-key swarm.key

  # Initialize a node on the open network
  $ swarmgated --home data/ --node-name node2 init --port 4243

  # Compare keys across machines without revealing them
  $ swarmgated fingerprint swarm.key

  # Run a node and dial a peer
  $ swarmgated --home data/ --node-name node1 run --dial /ip4/10.0.0.2/tcp/4242/p2p/12D3KooW...
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  SWARMGATE_HOME    Directory for node configuration\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    Keygen(KeygenCommand),
    Fingerprint(FingerprintCommand),
    #[command(alias = "up")]
    Run(RunCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for node configuration
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_node_dir())]
    #[arg(env = "SWARMGATE_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,

    /// Name of node
    #[arg(short, long, value_name = "NAME", default_value = "default")]
    pub node_name: Utf8PathBuf,
}

impl RootArgs {
    pub fn node_dir(&self) -> Utf8PathBuf {
        self.home.join(&self.node_name)
    }
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Init(init) => init.run(&self.args),
            SubCommands::Keygen(keygen) => keygen.run(),
            SubCommands::Fingerprint(fingerprint) => fingerprint.run(),
            SubCommands::Run(run) => run.run(&self.args).await,
        }
    }
}

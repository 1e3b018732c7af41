use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "forgechain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "init", about = "Create a new ledger by mining its genesis block")]
    Init,
    #[command(name = "mine", about = "Mine the next block and append it to the ledger")]
    Mine {
        #[arg(help = "The address to send the block reward to")]
        address: String,
    },
    #[command(name = "printchain", about = "Print all blocks in the ledger")]
    Printchain,
    #[command(
        name = "validate",
        about = "Re-check linkage, merkle roots and proof of work for every block"
    )]
    Validate,
}

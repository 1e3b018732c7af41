use clap::Parser;
use forgechain::{
    address_to_script, create_genesis_block, hash_to_display_hex, mine_block, script_to_address,
    to_hex, validate_address, Command, JsonLedgerStore, Ledger, MinePolicy, Opt, GLOBAL_PARAMS,
};
use log::{error, LevelFilter};
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();
    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let params = GLOBAL_PARAMS.clone();
    let store = JsonLedgerStore::new(&params.data_path);

    match command {
        Command::Init => {
            let genesis = create_genesis_block(&params, MinePolicy::Unbounded)?;
            let ledger = Ledger::create(store, params, genesis)?;
            println!(
                "Created ledger, genesis block {}",
                hash_to_display_hex(&ledger.tip().block_hash())
            );
        }
        Command::Mine { address } => {
            if !validate_address(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            let mut ledger = Ledger::open(store, params)?;
            let dest_script = address_to_script(&address)?;
            let block = mine_block(
                ledger.blocks(),
                dest_script,
                ledger.params(),
                MinePolicy::Unbounded,
            )?;
            let hash = hash_to_display_hex(&block.block_hash());
            ledger.append_block(block)?;
            println!("Mined block {hash} at height {}", ledger.height() - 1);
        }
        Command::Printchain => {
            let ledger = Ledger::open(store, params)?;
            for (height, block) in ledger.blocks().iter().enumerate() {
                println!("Height: {height}");
                println!("Block hash: {}", hash_to_display_hex(&block.block_hash()));
                println!(
                    "Prev hash: {}",
                    hash_to_display_hex(block.get_prev_block_hash())
                );
                println!(
                    "Time: {}, bits: {:#010x}, nonce: {}",
                    block.get_timestamp(),
                    block.get_bits(),
                    block.get_nonce()
                );
                for tx in block.get_transactions() {
                    println!("- Transaction {}", to_hex(&tx.hash()));
                    for output in tx.get_outputs() {
                        match script_to_address(output.get_script_pubkey()) {
                            Ok(address) => {
                                println!("-- Output value = {}, to = {address}", output.get_value())
                            }
                            Err(_) => println!(
                                "-- Output value = {}, script = {}",
                                output.get_value(),
                                to_hex(output.get_script_pubkey())
                            ),
                        }
                    }
                }
                println!();
            }
        }
        Command::Validate => {
            let ledger = Ledger::open(store, params)?;
            ledger.verify()?;
            println!("Ledger OK: {} blocks", ledger.height());
        }
    }
    Ok(())
}

pub mod block;
pub mod difficulty;
pub mod ledger;
pub mod merkle;
pub mod proof_of_work;
pub mod record;
pub mod transaction;

pub use block::{Block, ExpectedHash};
pub use difficulty::{bits_to_target, max_target, next_target, target_to_bits};
pub use ledger::Ledger;
pub use merkle::merkle_root;
pub use proof_of_work::{create_genesis_block, mine_block, MinePolicy, ProofOfWork};
pub use transaction::{OutPoint, Transaction, TxInput, TxOutput};

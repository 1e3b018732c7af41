pub mod address;
pub mod script;

pub use address::{
    address_to_hash160, address_to_script, hash160_to_address, script_to_address,
    validate_address,
};
pub use script::{extract_p2pkh_hash, p2pkh_script, push_data};

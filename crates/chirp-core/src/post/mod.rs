mod address;
mod count;
mod types;

pub use address::post_id_from_address;
pub use count::parse_count;
pub use types::*;

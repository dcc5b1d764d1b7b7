pub mod record;
pub mod state;

pub use record::*;
pub use state::*;

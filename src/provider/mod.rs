mod external;
mod types;


pub use external::*;
pub use types::*;

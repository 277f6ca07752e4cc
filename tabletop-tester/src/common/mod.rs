pub mod util;

pub use util::{parse_roles, split_csv};

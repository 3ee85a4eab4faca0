pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_set;
pub mod filter_order;
pub mod params;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter::Filter;
pub use filter_set::FilterSet;
pub use filter_where::FilterWhere;
pub use params::parse_query_pairs;

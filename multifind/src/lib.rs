pub mod config;
pub mod errors;
pub mod results;
pub mod search;
pub mod sink;

pub use config::{LaunchPolicy, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use results::{NameMatch, SearchSummary, WorkerId, WorkerOutcome};
pub use search::search;
pub use sink::{CollectingSink, LineSink, ResultSink};

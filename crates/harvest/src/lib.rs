pub mod adapter;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod logging;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod sink;
pub mod state;
pub mod transform;

pub use adapter::{AdapterMode, SiteAdapter};
pub use config::{load_job, load_job_from_str, LoadedJob};
pub use engine::{EngineBuilder, Execution, ScrapeEngine};
pub use enrich::Enricher;
pub use error::{
    ConfigError, ExtractError, FetchError, HarvestError, ParseError, Result, SinkError,
};
pub use fetch::Fetcher;
pub use model::{Job, Page, PageBody, Record, Report, Request, StageMetrics};
pub use parse::PageParser;
pub use pipeline::{PipelineError, PluginRegistry, ProcessingRunner, ProcessorPlugin};
pub use sink::{build_sink, CsvSink, JsonlSink, Sink};
pub use state::{IncrementalStateStore, SqliteStateStore, StateError};

//! # Converter Module
//!
//! Separa le responsabilità della conversione batch in sottomoduli:
//! - `batch_converter`: Orchestratore principale
//! - `worker_pool`: Pool di worker a dimensione fissa
//! - `result_aggregator`: Contatori e log dei messaggi condivisi tra i worker
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_converter;
pub mod path_resolver;
pub mod result_aggregator;
pub mod worker_pool;

pub use batch_converter::{BatchConverter, ConversionSummary};
pub use path_resolver::PathResolver;
pub use result_aggregator::{AggregateResult, Reporter, ResultAggregator};
pub use worker_pool::WorkerPool;

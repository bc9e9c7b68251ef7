pub mod category;
pub mod csv;
pub mod currency;
pub mod dedup;
pub mod pipeline;
pub mod sink;
pub mod validate;

pub use category::{AlwaysValid, CategoryIndex, CategoryResolver, Resolution};
pub use csv::{CanonicalField, HeaderMapping, ImportRow, MalformedCsvError};
pub use currency::{FixedRate, HttpRateSource, RateError, RateSource};
pub use dedup::ExistingTransaction;
pub use pipeline::{commit, preview, CommitRequest, ImportResult, Preview, RowKey};
pub use sink::{MemorySink, SinkError, TransactionSink};
pub use validate::{validate_row, ParsedTransaction, RowError};

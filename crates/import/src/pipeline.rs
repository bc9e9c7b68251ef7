use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::CategoryResolver;
use crate::csv::{parse_rows, HeaderMapping, MalformedCsvError};
use crate::currency::fill_missing_amount;
use crate::dedup::{find_duplicate, ExistingTransaction};
use crate::sink::{SinkError, TransactionSink};
use crate::validate::{validate_row, ParsedTransaction, RowError};

/// Output of the preview step: everything the user needs to decide what to
/// commit. Never touches persistent state.
#[derive(Debug, Serialize)]
pub struct Preview {
    pub transactions: Vec<ParsedTransaction>,
    pub errors: Vec<RowError>,
}

impl Preview {
    pub fn total(&self) -> usize {
        self.transactions.len() + self.errors.len()
    }
}

/// Key the client echoes back to select preview rows for commit. Matching on
/// name + date + amountCAD mirrors what the preview response exposes; it can
/// collide on genuinely identical rows, in which case both are selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowKey {
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "amountCAD", default)]
    pub amount_cad: Option<Decimal>,
}

impl RowKey {
    fn matches(&self, parsed: &ParsedTransaction) -> bool {
        self.name == parsed.tx.name
            && self.date == parsed.tx.date
            && self.amount_cad == parsed.tx.amount_cad
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
    /// Non-fatal annotations. A row whose category hint matched nothing still
    /// imports, uncategorised, and is flagged here.
    pub warnings: Vec<RowError>,
    pub inserted_ids: Vec<i64>,
    /// Set when a fatal persistence failure cut the batch short. Rows before
    /// the failure are committed and reported; the server surfaces this as a
    /// 500 alongside the partial result.
    pub aborted: Option<String>,
}

/// Parse + validate + soft category resolution + best-effort currency fill.
/// Deterministic for identical input: no clock, no randomness — the rate, if
/// any, is resolved by the caller beforehand.
pub fn preview(
    csv_text: &str,
    mapping: Option<&HeaderMapping>,
    resolver: &dyn CategoryResolver,
    cad_per_usd: Option<Decimal>,
) -> Result<Preview, MalformedCsvError> {
    let rows = parse_rows(csv_text, mapping)?;
    let mut transactions = Vec::new();
    let mut errors = Vec::new();

    for row in &rows {
        match validate_row(row, resolver) {
            Ok(mut parsed) => {
                if let Some(rate) = cad_per_usd {
                    fill_missing_amount(&mut parsed.tx, rate);
                }
                transactions.push(parsed);
            }
            Err(e) => errors.push(e),
        }
    }

    tracing::info!(
        total = rows.len(),
        valid = transactions.len(),
        invalid = errors.len(),
        "import preview"
    );

    Ok(Preview {
        transactions,
        errors,
    })
}

/// Everything a commit run needs besides the file itself: who is importing,
/// which preview rows they picked, and the collaborators to resolve
/// categories, convert currency, and detect duplicates against.
pub struct CommitRequest<'a> {
    pub user_id: &'a str,
    /// Empty means "import everything valid".
    pub selection: &'a [RowKey],
    pub resolver: &'a dyn CategoryResolver,
    pub cad_per_usd: Option<Decimal>,
    pub existing: &'a [ExistingTransaction],
}

/// Re-parse, re-validate, and persist. Client-echoed preview data is never
/// trusted as authoritative — only the selection keys are honoured, against a
/// fresh validation pass.
///
/// Every row gets exactly one outcome: inserted, a row error, or skipped by
/// selection (skipped rows are not counted at all). A `SinkError::Fatal`
/// abandons the remaining rows; everything inserted up to that point stays
/// inserted (per-row best-effort, no enclosing transaction).
pub async fn commit<S: TransactionSink>(
    csv_text: &str,
    mapping: Option<&HeaderMapping>,
    request: CommitRequest<'_>,
    sink: &S,
) -> Result<ImportResult, MalformedCsvError> {
    let rows = parse_rows(csv_text, mapping)?;

    let mut result = ImportResult::default();
    let mut candidates = Vec::new();

    for row in &rows {
        match validate_row(row, request.resolver) {
            Ok(mut parsed) => {
                // Fill before matching the selection: the preview the client
                // picked rows from showed post-conversion amounts.
                if let Some(rate) = request.cad_per_usd {
                    fill_missing_amount(&mut parsed.tx, rate);
                }
                if request.selection.is_empty()
                    || request.selection.iter().any(|k| k.matches(&parsed))
                {
                    candidates.push(parsed);
                }
            }
            Err(e) => {
                result.failed += 1;
                result.errors.push(e);
            }
        }
    }

    let mut remaining = candidates.len();
    for parsed in candidates {
        remaining -= 1;

        if find_duplicate(&parsed.tx, request.existing).is_some() {
            result.failed += 1;
            result.errors.push(RowError {
                row: parsed.row,
                message: "Duplicate of existing transaction".to_string(),
            });
            continue;
        }

        match sink.insert(request.user_id, &parsed.tx).await {
            Ok(id) => {
                result.succeeded += 1;
                result.inserted_ids.push(id);
                if parsed.category_unresolved {
                    result.warnings.push(RowError {
                        row: parsed.row,
                        message: format!(
                            "Unrecognized category \"{}\", imported without one",
                            parsed.category_hint.as_deref().unwrap_or("")
                        ),
                    });
                }
            }
            Err(SinkError::Row(message)) => {
                result.failed += 1;
                result.errors.push(RowError {
                    row: parsed.row,
                    message,
                });
            }
            Err(SinkError::Fatal(message)) => {
                tracing::warn!(row = parsed.row, %message, "import aborted");
                result.failed += 1 + remaining;
                result.errors.push(RowError {
                    row: parsed.row,
                    message: format!("Import aborted: {message}"),
                });
                result.aborted = Some(message);
                break;
            }
        }
    }

    result.total = result.succeeded + result.failed;

    tracing::info!(
        total = result.total,
        succeeded = result.succeeded,
        failed = result.failed,
        "import commit"
    );

    Ok(result)
}

// Export module.
// Flattens stored records into CSV rows. Column set and order are fixed;
// the header goes out once, then one row per record in query order.

use std::path::Path;

use crate::error::AppError;
use crate::models::job::JobRecord;

/// Column order for every export, header included.
pub const COLUMNS: [&str; 13] = [
    "id",
    "title",
    "company_name",
    "location_name",
    "job_type",
    "salary_min",
    "salary_max",
    "salary_currency",
    "url",
    "source",
    "skills",
    "ingested_at",
    "description",
];

/// Joins the skills list into one cell.
const SKILLS_DELIMITER: &str = ",";

/// Flatten records into rows of cells, one pass, in the order received.
pub fn to_rows(
    records: impl IntoIterator<Item = JobRecord>,
) -> impl Iterator<Item = Vec<String>> {
    records.into_iter().map(|job| {
        vec![
            job.id,
            job.title,
            job.company_name,
            job.location_name,
            job.job_type,
            number_cell(job.salary_min),
            number_cell(job.salary_max),
            job.salary_currency,
            job.url,
            job.source,
            job.skills.join(SKILLS_DELIMITER),
            job.ingested_at.to_rfc3339(),
            job.description,
        ]
    })
}

/// Write header plus one row per record to `path`. Returns the number of
/// data rows written.
pub async fn write_csv(
    path: &Path,
    records: impl IntoIterator<Item = JobRecord>,
) -> Result<u64, AppError> {
    let mut out = String::new();
    push_row(&mut out, COLUMNS.iter().map(|c| c.to_string()));

    let mut count = 0u64;
    for row in to_rows(records) {
        push_row(&mut out, row);
        count += 1;
    }

    tokio::fs::write(path, out).await?;
    Ok(count)
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape(&cell));
    }
    out.push('\n');
}

/// Absent values become empty cells, never a placeholder word.
fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a field when it contains the delimiter, a quote or a line break,
/// doubling any embedded quotes.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

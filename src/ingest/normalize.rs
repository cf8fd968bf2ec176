use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;
use crate::models::job::JobRecord;

/// Longest description kept on a record; anything beyond is cut.
const MAX_DESCRIPTION_CHARS: usize = 10_000;

/// Convert one raw source entry into a canonical record.
///
/// The only hard requirement on the raw shape is a usable `id`; everything
/// else degrades to a default when absent. Nested objects (company,
/// location, salary) are unwrapped field by field so a missing object never
/// surfaces as a missing-field error.
pub fn normalize(raw: &Value, source: &str) -> Result<JobRecord, AppError> {
    let id = extract_id(raw)?;

    let company_name = raw
        .get("company")
        .and_then(|c| c.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let location_name = raw
        .get("location")
        .and_then(|l| l.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let (salary_min, salary_max, salary_currency) = extract_salary(raw);

    let skills = raw
        .get("skills")
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .get("name")
                        .and_then(|v| v.as_str())
                        .or_else(|| entry.as_str())
                })
                .map(clean_text)
                .collect()
        })
        .unwrap_or_default();

    let description = raw
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let job_type = raw.get("type").and_then(|v| v.as_str()).unwrap_or("");

    Ok(JobRecord {
        id,
        title: clean_text(raw.get("title").and_then(|v| v.as_str()).unwrap_or("")),
        company_name: clean_text(company_name),
        location_name: clean_text(location_name),
        description: truncate(&clean_text(description), MAX_DESCRIPTION_CHARS),
        url: raw
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string(),
        job_type: normalize_job_type(job_type),
        salary_min,
        salary_max,
        salary_currency,
        skills,
        source: source.to_string(),
        ingested_at: Utc::now(),
    })
}

/// Pull out the identifier, accepting string or integer ids. Anything else
/// fails the record.
fn extract_id(raw: &Value) -> Result<String, AppError> {
    let id = match raw.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.is_empty() {
        return Err(AppError::Validation(
            "Record has no usable 'id' field".to_string(),
        ));
    }
    Ok(id)
}

/// Unwrap the optional nested salary object. Currency defaults to USD when
/// a salary object is present without one, and stays empty when there is
/// no salary at all.
fn extract_salary(raw: &Value) -> (Option<f64>, Option<f64>, String) {
    let Some(salary) = raw.get("salary").filter(|v| v.is_object()) else {
        return (None, None, String::new());
    };
    let min = salary.get("min").and_then(|v| v.as_f64());
    let max = salary.get("max").and_then(|v| v.as_f64());
    let currency = salary
        .get("currency")
        .and_then(|v| v.as_str())
        .unwrap_or("USD")
        .to_string();
    (min, max, currency)
}

/// Collapse runs of whitespace and trim.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut a string to at most `max` characters, appending an ellipsis marker
/// when anything was dropped.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Map free-form job type strings onto a small canonical set, falling back
/// to capitalizing the cleaned input when no variant matches.
fn normalize_job_type(job_type: &str) -> String {
    let cleaned = clean_text(job_type).to_lowercase();

    let variants: [(&[&str], &str); 6] = [
        (&["full time", "full-time", "fulltime"], "Full-time"),
        (&["part time", "part-time", "parttime"], "Part-time"),
        (&["contract", "contractor"], "Contract"),
        (&["temp", "temporary"], "Temporary"),
        (&["intern", "internship"], "Internship"),
        (&["freelance", "freelancer"], "Freelance"),
    ];
    for (terms, canonical) in variants {
        if terms.iter().any(|term| cleaned.contains(term)) {
            return canonical.to_string();
        }
    }

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_id_fails_validation() {
        let raw = json!({"title": "Engineer"});
        assert!(matches!(
            normalize(&raw, "s01"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn blank_id_fails_validation() {
        let raw = json!({"id": "   "});
        assert!(normalize(&raw, "s01").is_err());
    }

    #[test]
    fn numeric_id_is_accepted() {
        let raw = json!({"id": 42});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.id, "42");
    }

    #[test]
    fn absent_nested_objects_degrade_to_defaults() {
        let raw = json!({"id": "j1", "title": "Engineer"});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.company_name, "");
        assert_eq!(job.location_name, "");
        assert_eq!(job.salary_min, None);
        assert_eq!(job.salary_max, None);
        assert_eq!(job.salary_currency, "");
        assert!(job.skills.is_empty());
    }

    #[test]
    fn nested_fields_are_extracted() {
        let raw = json!({
            "id": "j1",
            "title": "  Backend   Engineer ",
            "company": {"name": "Acme Corp", "size": 500},
            "location": {"name": "Berlin", "country": "DE"},
            "url": "https://example.com/j1",
        });
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.company_name, "Acme Corp");
        assert_eq!(job.location_name, "Berlin");
        assert_eq!(job.url, "https://example.com/j1");
        assert_eq!(job.source, "s01");
    }

    #[test]
    fn salary_currency_defaults_when_object_present() {
        let raw = json!({"id": "j1", "salary": {"min": 50000, "max": 70000}});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.salary_min, Some(50000.0));
        assert_eq!(job.salary_max, Some(70000.0));
        assert_eq!(job.salary_currency, "USD");
    }

    #[test]
    fn explicit_currency_is_kept() {
        let raw = json!({"id": "j1", "salary": {"min": 45000.5, "currency": "EUR"}});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.salary_min, Some(45000.5));
        assert_eq!(job.salary_max, None);
        assert_eq!(job.salary_currency, "EUR");
    }

    #[test]
    fn skills_keep_order_and_skip_nonconforming() {
        let raw = json!({
            "id": "j1",
            "skills": [
                {"name": "Go", "level": "senior"},
                "SQL",
                {"label": "no name field"},
                17,
                {"name": "Kubernetes"},
            ],
        });
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.skills, vec!["Go", "SQL", "Kubernetes"]);
    }

    #[test]
    fn job_type_variants_are_canonicalized() {
        for (input, expected) in [
            ("full time", "Full-time"),
            ("Full-Time", "Full-time"),
            ("FULLTIME", "Full-time"),
            ("part-time", "Part-time"),
            ("contractor", "Contract"),
            ("temp", "Temporary"),
            ("summer internship", "Internship"),
            ("freelancer", "Freelance"),
            ("seasonal", "Seasonal"),
        ] {
            let raw = json!({"id": "j1", "type": input});
            let job = normalize(&raw, "s01").unwrap();
            assert_eq!(job.job_type, expected, "for input {input:?}");
        }
    }

    #[test]
    fn long_description_is_truncated_on_char_boundary() {
        let description = "ü".repeat(10_500);
        let raw = json!({"id": "j1", "description": description});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.description.chars().count(), 10_003);
        assert!(job.description.ends_with("..."));
    }

    #[test]
    fn short_description_is_untouched() {
        let raw = json!({"id": "j1", "description": "Build  things\n remotely"});
        let job = normalize(&raw, "s01").unwrap();
        assert_eq!(job.description, "Build things remotely");
    }
}

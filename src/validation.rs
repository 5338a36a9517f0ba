use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::RowError;
use crate::types::{MonitorDefinition, MonitorRow, MonitorType};

pub const DEFAULT_PRIORITY: i64 = 3;

/// Checks a sheet row before anything is sent to the platform; an empty list means valid.
pub fn validate_row(row: &MonitorRow) -> Vec<String> {
    let mut errors = Vec::new();
    if row.name.trim().is_empty() {
        errors.push("Missing name".to_string());
    }
    if row.monitor_type.parse::<MonitorType>().is_err() {
        errors.push(format!("Unsupported or missing monitor type: {}", row.monitor_type.trim()));
    }
    if row.query.trim().is_empty() {
        errors.push("Missing query".to_string());
    }
    if row.message.trim().is_empty() {
        errors.push("Missing message".to_string());
    }
    if let Err(e) = parse_options(&row.options_json) {
        errors.push(e);
    }
    if let Err(e) = parse_priority(row.priority.as_deref()) {
        errors.push(e);
    }
    errors
}

/// Same text-field checks applied to an already built definition.
pub fn validate_definition(def: &MonitorDefinition) -> Vec<String> {
    let mut errors = Vec::new();
    if def.name.trim().is_empty() {
        errors.push("Missing name".to_string());
    }
    if def.query.trim().is_empty() {
        errors.push("Missing query".to_string());
    }
    if def.message.trim().is_empty() {
        errors.push("Missing message".to_string());
    }
    errors
}

/// Comma-separated tags; entries are trimmed and blanks dropped.
pub fn parse_tags(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank text is an empty options object; anything else must be a JSON object.
pub fn parse_options(text: &str) -> Result<Map<String, Value>, String> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("Invalid options_json: expected an object, got {}", other)),
        Err(e) => Err(format!("Invalid options_json: {}", e)),
    }
}

pub fn parse_priority(text: Option<&str>) -> Result<i64, String> {
    let text = text.map(str::trim).unwrap_or("");
    if text.is_empty() {
        return Ok(DEFAULT_PRIORITY);
    }
    if let Ok(p) = text.parse::<i64>() {
        return Ok(p);
    }
    match text.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
        _ => Err(format!("Invalid priority: {}", text)),
    }
}

/// Validates a row and builds the definition it describes.
pub fn definition_from_row(row: &MonitorRow) -> Result<MonitorDefinition, RowError> {
    let errors = validate_row(row);
    if !errors.is_empty() {
        return Err(RowError::Validation(errors));
    }
    let invalid = |e: String| RowError::Validation(vec![e]);
    Ok(MonitorDefinition {
        name: row.name.trim().to_string(),
        monitor_type: row.monitor_type.parse().map_err(invalid)?,
        query: row.query.clone(),
        message: row.message.clone(),
        tags: parse_tags(&row.tags),
        options: parse_options(&row.options_json).map_err(invalid)?,
        priority: parse_priority(row.priority.as_deref()).map_err(invalid)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_row() -> MonitorRow {
        MonitorRow {
            sheet_row: 2,
            name: "API latency".to_string(),
            monitor_type: "query alert".to_string(),
            query: "avg(last_5m):avg:trace.http.request.duration{service:api} > 2".to_string(),
            message: "{{#is_alert}}slow{{/is_alert}}".to_string(),
            tags: "team:sre, env:prod,,".to_string(),
            options_json: r#"{"thresholds": {"critical": 2}, "notify_no_data": false}"#.to_string(),
            priority: None,
        }
    }

    #[test]
    fn valid_row_has_no_errors() {
        assert!(validate_row(&valid_row()).is_empty());
    }

    #[test]
    fn unsupported_type_is_reported() {
        let row = MonitorRow { monitor_type: "nonsense".to_string(), ..valid_row() };
        let errors = validate_row(&row);
        assert_eq!(errors, vec!["Unsupported or missing monitor type: nonsense"]);
    }

    #[test]
    fn blank_fields_are_all_reported() {
        let row = MonitorRow {
            name: "  ".to_string(),
            monitor_type: String::new(),
            query: String::new(),
            message: "\n".to_string(),
            ..valid_row()
        };
        let errors = validate_row(&row);
        assert_eq!(
            errors,
            vec![
                "Missing name",
                "Unsupported or missing monitor type: ",
                "Missing query",
                "Missing message",
            ]
        );
    }

    #[test]
    fn options_must_be_a_json_object() {
        assert!(parse_options("").unwrap().is_empty());
        assert!(parse_options("[1,2]").unwrap_err().contains("expected an object"));
        assert!(parse_options("{not json").unwrap_err().starts_with("Invalid options_json"));
        let row = MonitorRow { options_json: "{oops".to_string(), ..valid_row() };
        assert_eq!(validate_row(&row).len(), 1);
    }

    #[test]
    fn priority_defaults_and_parses() {
        assert_eq!(parse_priority(None), Ok(3));
        assert_eq!(parse_priority(Some(" ")), Ok(3));
        assert_eq!(parse_priority(Some("1")), Ok(1));
        assert_eq!(parse_priority(Some("5.0")), Ok(5));
        assert!(parse_priority(Some("high")).is_err());
        assert!(parse_priority(Some("2.5")).is_err());
    }

    #[test]
    fn tags_split_on_commas() {
        let tags = parse_tags("team:sre, env:prod,,");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["env:prod", "team:sre"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn builds_definition_from_row() {
        let row = MonitorRow { priority: Some("2".to_string()), ..valid_row() };
        let def = definition_from_row(&row).unwrap();
        assert_eq!(def.name, "API latency");
        assert_eq!(def.monitor_type, MonitorType::QueryAlert);
        assert_eq!(def.priority, 2);
        assert_eq!(def.options["thresholds"]["critical"], 2);
        assert!(def.tags.contains("team:sre"));
    }

    #[test]
    fn invalid_row_yields_validation_error() {
        let row = MonitorRow { query: String::new(), ..valid_row() };
        assert_eq!(
            definition_from_row(&row),
            Err(RowError::Validation(vec!["Missing query".to_string()]))
        );
    }

    #[test]
    fn definition_checks_text_fields() {
        let mut def = definition_from_row(&valid_row()).unwrap();
        assert!(validate_definition(&def).is_empty());
        def.message = " ".to_string();
        assert_eq!(validate_definition(&def), vec!["Missing message"]);
    }
}

use gmxana::core::tools::ArgValue;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid format: '{0}'. Expected KEY=VALUE.")]
    MissingValue(String),

    #[error("Key cannot be empty in '{0}'.")]
    EmptyKey(String),

    #[error("Invalid boolean value for {key}: '{value}'. Expected true or false.")]
    InvalidBool { key: String, value: String },
}

/// Splits `KEY=VALUE` at the first `=`.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::MissingValue(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyKey(input.to_string()));
    }
    Ok((key, value.trim()))
}

pub fn parse_bool(key: &str, value: &str) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses a Gromacs tool option given on the command line.
///
/// `KEY` alone is a switch, `KEY=true|false` toggles a switch and anything else is passed as
/// a value. Leading dashes on the key are dropped.
pub fn parse_tool_arg(input: &str) -> Result<(String, ArgValue), ParseError> {
    let (key, value) = match input.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (input.trim(), None),
    };
    let key = key.trim_start_matches('-');
    if key.is_empty() {
        return Err(ParseError::EmptyKey(input.to_string()));
    }
    let value = match value {
        None => ArgValue::Flag(true),
        Some(v) => match parse_bool(key, v) {
            Ok(flag) if !v.chars().all(|c| c.is_ascii_digit()) => ArgValue::Flag(flag),
            _ => ArgValue::Value(v.to_string()),
        },
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_at_first_equals_sign() {
        assert_eq!(
            parse_key_value("plot.formats=svg,png").unwrap(),
            ("plot.formats", "svg,png")
        );
        assert_eq!(parse_key_value("a=b=c").unwrap(), ("a", "b=c"));
        assert_eq!(
            parse_key_value("simulation.strict"),
            Err(ParseError::MissingValue("simulation.strict".into()))
        );
        assert_eq!(
            parse_key_value("=1"),
            Err(ParseError::EmptyKey("=1".into()))
        );
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(parse_bool("k", "TRUE"), Ok(true));
        assert_eq!(parse_bool("k", "off"), Ok(false));
        assert!(matches!(
            parse_bool("k", "maybe"),
            Err(ParseError::InvalidBool { .. })
        ));
    }

    #[test]
    fn tool_args_distinguish_switches_and_values() {
        assert_eq!(
            parse_tool_arg("-pbc").unwrap(),
            ("pbc".to_string(), ArgValue::Flag(true))
        );
        assert_eq!(
            parse_tool_arg("pbc=false").unwrap(),
            ("pbc".to_string(), ArgValue::Flag(false))
        );
        assert_eq!(
            parse_tool_arg("b=1000").unwrap(),
            ("b".to_string(), ArgValue::Value("1000".into()))
        );
        assert_eq!(
            parse_tool_arg("dt=1").unwrap(),
            ("dt".to_string(), ArgValue::Value("1".into()))
        );
        assert!(parse_tool_arg("--").is_err());
    }
}

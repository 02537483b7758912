//! Parsing of algorithm configuration strings.

use std::collections::HashMap;

/// Splits a config value like `RankedBFS[max_hop=2]` into the name and the options string.
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.trim().split_once('[') {
        Some((l, r)) => (l.trim().to_string(), Some(r.replace(']', ""))),
        None => (config_str.trim().to_string(), None),
    }
}

/// Parses `name=value` pairs separated by commas.
///
/// # Examples
///
/// ```rust
/// use vne_embedding::options::parse_options;
///
/// let options = parse_options("max_hop=2, k=3");
/// assert_eq!(options.get("max_hop").unwrap(), "2");
/// assert_eq!(options.get("k").unwrap(), "3");
/// assert_eq!(options.get("time_window"), None);
/// ```
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    options
}

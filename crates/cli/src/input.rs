use crate::error::CliError;
use model::core::value::Value;
use planner::filter::FilterNode;

/// Returns the argument itself, or the contents of the file it names when
/// it starts with `@`.
pub async fn read_arg(arg: &str) -> Result<String, CliError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => Ok(arg.to_string()),
    }
}

pub async fn read_filter(arg: &str) -> Result<FilterNode, CliError> {
    let source = read_arg(arg).await?;
    Ok(FilterNode::from_json_str(&source)?)
}

/// Account ids separated by commas or whitespace. Numeric ids become
/// integers, everything else is kept as text.
pub async fn read_acct_ids(arg: &str) -> Result<Vec<Value>, CliError> {
    let ids = parse_acct_ids(&read_arg(arg).await?);
    if ids.is_empty() {
        return Err(CliError::InvalidInput("no account ids given".to_string()));
    }
    Ok(ids)
}

fn parse_acct_ids(source: &str) -> Vec<Value> {
    source
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|id| id.trim_matches(|c| c == '"' || c == '\''))
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::String(id.to_string()))
        })
        .collect()
}

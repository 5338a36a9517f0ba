use crate::types::ChecklistEntry;
use crate::workbook::ConfigEnvironment;

// Positional convention of a config column's token array.
pub const ENVIRONMENT_INDEX: usize = 1;
pub const CLUSTER_INDEX: usize = 2;
pub const NAMESPACE_INDEX: usize = 3;
pub const SERVICE_INDEX: usize = 4;

/// Values interpolated into monitor templates. Any field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub environment: String,
    pub cluster: String,
    pub namespace: String,
    pub service: String,
}

/// Text after the first `=` of the token at `index`; `""` when the index is
/// out of range or the token has no `=`.
pub fn token_value(tokens: &[String], index: usize) -> String {
    tokens
        .get(index)
        .and_then(|token| token.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

pub fn resolve_tokens(tokens: &[String]) -> ResolvedEnvironment {
    ResolvedEnvironment {
        environment: token_value(tokens, ENVIRONMENT_INDEX),
        cluster: token_value(tokens, CLUSTER_INDEX),
        namespace: token_value(tokens, NAMESPACE_INDEX),
        service: token_value(tokens, SERVICE_INDEX),
    }
}

/// Looks up the config column named by the entry's header. A missing column
/// resolves like an empty token array.
pub fn resolve(entry: &ChecklistEntry, config: &ConfigEnvironment) -> ResolvedEnvironment {
    resolve_tokens(config.get(&entry.header_label).unwrap_or(&[]))
}

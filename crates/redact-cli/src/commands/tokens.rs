//! Tokens command - list token assignments

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use redact_core::EntityKind;
use redact_tokens::TokenManager;

use super::Context;

pub fn handle(
    ctx: &Context,
    mapping: Option<PathBuf>,
    typ: Option<&str>,
    json: bool,
) -> Result<()> {
    let mapping = ctx.mapping_path(mapping);
    let kind = typ.map(str::parse::<EntityKind>).transpose()?;

    let tokens = TokenManager::open(&mapping)
        .with_context(|| format!("Failed to open token map {}", mapping.display()))?;
    let items = select(tokens.all_items(), kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.values().all(BTreeMap::is_empty) {
        println!("No tokens in {}", mapping.display());
        return Ok(());
    }
    for line in format_lines(&items) {
        println!("{}", line);
    }
    Ok(())
}

type TokenTable = BTreeMap<String, BTreeMap<String, String>>;

fn select(mut items: TokenTable, kind: Option<EntityKind>) -> TokenTable {
    if let Some(kind) = kind {
        items.retain(|label, _| label == kind.label());
    }
    items
}

/// One `token  value` line per assignment, ordered by token
fn format_lines(items: &TokenTable) -> Vec<String> {
    let mut lines = Vec::new();
    for (label, assigned) in items {
        if assigned.is_empty() {
            continue;
        }
        lines.push(format!("{} ({})", label, assigned.len()));
        let mut pairs: Vec<(&String, &String)> = assigned.iter().collect();
        pairs.sort_by(|a, b| a.1.cmp(b.1));
        for (key, token) in pairs {
            lines.push(format!("  {}  {}", token, key));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TokenTable {
        let mut phones = BTreeMap::new();
        phones.insert("+79991234567".to_string(), "[PHONE_002]".to_string());
        phones.insert("+79120001122".to_string(), "[PHONE_001]".to_string());
        let mut items = TokenTable::new();
        items.insert("PHONE".to_string(), phones);
        items.insert("PER".to_string(), BTreeMap::new());
        items
    }

    #[test]
    fn test_format_lines_by_token() {
        let lines = format_lines(&table());
        assert_eq!(
            lines,
            vec![
                "PHONE (2)",
                "  [PHONE_001]  +79120001122",
                "  [PHONE_002]  +79991234567",
            ]
        );
    }

    #[test]
    fn test_select_kind() {
        let only = select(table(), Some(EntityKind::Person));
        assert_eq!(only.len(), 1);
        assert!(only.contains_key("PER"));
        assert_eq!(select(table(), None).len(), 2);
    }
}

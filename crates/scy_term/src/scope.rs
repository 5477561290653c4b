//! Per-symbol scope and key-use metadata, kept alongside the interner
//! rather than inside it so `scy_base::Interner` stays a reusable,
//! domain-agnostic string table.

use std::collections::HashMap;

use scy_base::Symbol;

/// Where a name was declared.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ScopeLevel {
    #[default]
    Global,
    RoleTemplate,
    RunLocal,
}

/// Whether a name is ever used in key position, needed by the heuristic's
/// key-level escalation sub-score.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum KeyLevel {
    #[default]
    Ordinary,
    UsedAsKey,
}

#[derive(Clone, Copy, Default, Debug)]
struct SymbolMeta {
    scope: ScopeLevel,
    key_level: KeyLevel,
}

/// Side table mapping interned symbols to their scope and key-use level.
#[derive(Default)]
pub struct ScopeTable {
    meta: HashMap<Symbol, SymbolMeta>,
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable { meta: HashMap::new() }
    }

    pub fn set_scope(&mut self, symbol: Symbol, scope: ScopeLevel) {
        self.meta.entry(symbol).or_default().scope = scope;
    }

    pub fn mark_key_use(&mut self, symbol: Symbol) {
        self.meta.entry(symbol).or_default().key_level = KeyLevel::UsedAsKey;
    }

    pub fn scope_of(&self, symbol: Symbol) -> ScopeLevel {
        self.meta.get(&symbol).map(|m| m.scope).unwrap_or_default()
    }

    pub fn key_level_of(&self, symbol: Symbol) -> KeyLevel {
        self.meta.get(&symbol).map(|m| m.key_level).unwrap_or_default()
    }
}

//! Sets of ATN configurations with context merging.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::AtnConfig;
use crate::context::{MergeCache, PredictionContextCache, cached_context, merge};
use crate::error::ConfigSetError;
use crate::semantic::SemanticContext;

/// Alternative numbers, ascending.
pub type AltSet = BTreeSet<usize>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ConfigKey {
    /// Parser sets: configs differing only in context are merged.
    Merge {
        state: usize,
        alt: usize,
        semantic: SemanticContext,
    },
    /// Lexer sets: every distinct config is kept, in insertion order.
    Exact(AtnConfig),
}

/// Insertion-ordered configurations, deduplicated by key.
#[derive(Clone, Debug)]
pub struct AtnConfigSet {
    configs: Vec<AtnConfig>,
    lookup: FxHashMap<ConfigKey, usize>,
    exact: bool,
    readonly: bool,
    /// Built for full-context (LL) prediction: `$` stays distinct on merge.
    pub full_ctx: bool,
    pub unique_alt: Option<usize>,
    pub conflicting_alts: Option<AltSet>,
    pub has_semantic_context: bool,
    pub dips_into_outer_context: bool,
}

impl AtnConfigSet {
    pub fn new(full_ctx: bool) -> Self {
        Self {
            configs: Vec::new(),
            lookup: FxHashMap::default(),
            exact: false,
            readonly: false,
            full_ctx,
            unique_alt: None,
            conflicting_alts: None,
            has_semantic_context: false,
            dips_into_outer_context: false,
        }
    }

    /// Set for lexer prediction, keyed on full config identity.
    pub fn ordered() -> Self {
        Self {
            exact: true,
            ..Self::new(true)
        }
    }

    /// Adds `config`, or merges its context into an existing config with the
    /// same key.
    pub fn add(
        &mut self,
        config: AtnConfig,
        cache: Option<&mut MergeCache>,
    ) -> Result<(), ConfigSetError> {
        if self.readonly {
            return Err(ConfigSetError::ReadOnly);
        }
        if !config.semantic_context.is_none() {
            self.has_semantic_context = true;
        }
        if config.reaches_into_outer_context > 0 {
            self.dips_into_outer_context = true;
        }

        let key = if self.exact {
            ConfigKey::Exact(config.clone())
        } else {
            ConfigKey::Merge {
                state: config.state,
                alt: config.alt,
                semantic: config.semantic_context.clone(),
            }
        };

        let Some(&i) = self.lookup.get(&key) else {
            self.lookup.insert(key, self.configs.len());
            self.configs.push(config);
            return Ok(());
        };

        let existing = &mut self.configs[i];
        let merged = merge(&existing.context, &config.context, !self.full_ctx, cache);
        existing.reaches_into_outer_context = existing
            .reaches_into_outer_context
            .max(config.reaches_into_outer_context);
        if config.precedence_filter_suppressed {
            existing.precedence_filter_suppressed = true;
        }
        existing.context = merged;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtnConfig> {
        self.configs.iter()
    }

    pub fn configs(&self) -> &[AtnConfig] {
        &self.configs
    }

    pub fn get(&self, i: usize) -> Option<&AtnConfig> {
        self.configs.get(i)
    }

    pub fn alts(&self) -> AltSet {
        self.configs.iter().map(|c| c.alt).collect()
    }

    pub fn states(&self) -> BTreeSet<usize> {
        self.configs.iter().map(|c| c.state).collect()
    }

    /// Non-trivial semantic contexts, in config order.
    pub fn predicates(&self) -> Vec<SemanticContext> {
        self.configs
            .iter()
            .filter(|c| !c.semantic_context.is_none())
            .map(|c| c.semantic_context.clone())
            .collect()
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Replaces every context with its canonical cached instance.
    pub fn optimize_configs(&mut self, cache: &PredictionContextCache) -> Result<(), ConfigSetError> {
        if self.readonly {
            return Err(ConfigSetError::ReadOnly);
        }
        if self.configs.is_empty() {
            return Ok(());
        }
        let mut visited = FxHashMap::default();
        for config in &mut self.configs {
            config.context = cached_context(&config.context, cache, &mut visited);
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ConfigSetError> {
        if self.readonly {
            return Err(ConfigSetError::ReadOnly);
        }
        self.configs.clear();
        self.lookup.clear();
        self.has_semantic_context = false;
        self.dips_into_outer_context = false;
        Ok(())
    }

    /// Shared, frozen copy for storing in a DFA state.
    pub fn into_frozen(mut self) -> Arc<AtnConfigSet> {
        self.set_readonly(true);
        Arc::new(self)
    }
}

impl<'a> IntoIterator for &'a AtnConfigSet {
    type Item = &'a AtnConfig;
    type IntoIter = std::slice::Iter<'a, AtnConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}

impl PartialEq for AtnConfigSet {
    fn eq(&self, other: &Self) -> bool {
        self.full_ctx == other.full_ctx
            && self.unique_alt == other.unique_alt
            && self.conflicting_alts == other.conflicting_alts
            && self.has_semantic_context == other.has_semantic_context
            && self.dips_into_outer_context == other.dips_into_outer_context
            && self.configs == other.configs
    }
}

impl Eq for AtnConfigSet {}

impl Hash for AtnConfigSet {
    fn hash<H: Hasher>(&self, h: &mut H) {
        self.full_ctx.hash(h);
        self.configs.hash(h);
    }
}

impl fmt::Display for AtnConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, config) in self.configs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{config}")?;
        }
        write!(f, "]")?;
        if self.has_semantic_context {
            write!(f, ",hasSemanticContext=true")?;
        }
        if let Some(alt) = self.unique_alt {
            write!(f, ",uniqueAlt={alt}")?;
        }
        if let Some(alts) = &self.conflicting_alts {
            write!(f, ",conflictingAlts={alts:?}")?;
        }
        if self.dips_into_outer_context {
            write!(f, ",dipsIntoOuterContext")?;
        }
        Ok(())
    }
}

use std::collections::BTreeMap;

use super::{Grammar, Symbol, SymbolSet};

/// For each symbol, the terminals that can start a string derived from
/// it; epsilon marks derivations of the empty string.
#[derive(Debug)]
pub struct FirstSets {
    inner: BTreeMap<Symbol, SymbolSet>,
}

impl FirstSets {
    pub fn get(&self, s: Symbol) -> Option<&SymbolSet> {
        self.inner.get(&s)
    }

    /// The first set of a concatenation of symbols.
    pub fn first_concat(&self, symbols: impl IntoIterator<Item = Symbol>) -> SymbolSet {
        let mut out = SymbolSet::new();
        let mut all_epsilon = true;
        for s in symbols {
            let Some(f) = self.get(s) else { break };
            let mut head = f.clone();
            head.remove_epsilon();
            out.absorb(&head);
            if !f.contains_epsilon() {
                all_epsilon = false;
                break;
            }
        }
        if all_epsilon {
            out.add_epsilon();
        }
        out
    }

    /// Fixed-point computation over the rules: a terminal starts with
    /// itself, a non-terminal with whatever starts any of its
    /// alternatives.
    pub(crate) fn compute(grammar: &Grammar) -> Self {
        let mut inner: BTreeMap<Symbol, SymbolSet> = BTreeMap::new();
        for t in grammar.terminals().iter() {
            inner.entry(t).or_default().add(t);
        }
        inner
            .entry(Symbol::epsilon())
            .or_default()
            .add_epsilon();
        for nt in grammar.non_terminals().iter() {
            inner.entry(nt).or_default();
        }

        let mut changing = true;
        while changing {
            changing = false;
            for rule in grammar.rules() {
                let mut rhs_first = SymbolSet::new();
                let mut all_epsilon = true;
                for &s in rule.rhs() {
                    let f = &inner[&s];
                    let mut head = f.clone();
                    head.remove_epsilon();
                    rhs_first.absorb(&head);
                    if !f.contains_epsilon() {
                        all_epsilon = false;
                        break;
                    }
                }
                if all_epsilon {
                    rhs_first.add_epsilon();
                }
                let lhs = inner
                    .get_mut(&rule.lhs())
                    .unwrap_or_else(|| unreachable!());
                changing |= lhs.absorb(&rhs_first);
            }
        }

        Self { inner }
    }
}

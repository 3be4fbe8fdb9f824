use std::collections::BTreeMap;

use super::{Grammar, Symbol, SymbolSet};

/// For each non-terminal, the terminals that can appear immediately
/// after it in a derivation from the goal.
#[derive(Debug)]
pub struct FollowSets {
    inner: BTreeMap<Symbol, SymbolSet>,
}

impl FollowSets {
    pub fn get(&self, s: Symbol) -> Option<&SymbolSet> {
        self.inner.get(&s)
    }

    pub(crate) fn compute(grammar: &Grammar) -> Self {
        let firsts = grammar.first_sets();
        let mut inner: BTreeMap<Symbol, SymbolSet> = grammar
            .non_terminals()
            .iter()
            .map(|nt| (nt, SymbolSet::new()))
            .collect();
        if let Some(goal) = inner.get_mut(&grammar.goal()) {
            goal.add(Symbol::eof());
        }

        let mut changing = true;
        while changing {
            changing = false;
            for rule in grammar.rules() {
                for (i, &s) in rule.rhs().iter().enumerate() {
                    if !grammar.is_non_terminal(s) {
                        continue;
                    }
                    let tail = rule.rhs()[i + 1..].iter().copied();
                    let mut trailer = firsts.first_concat(tail);
                    let nullable_tail = trailer.contains_epsilon();
                    trailer.remove_epsilon();
                    if nullable_tail {
                        // whatever follows the left-hand side follows s
                        let lhs_follow = inner[&rule.lhs()].clone();
                        trailer.absorb(&lhs_follow);
                    }
                    let follow = inner.get_mut(&s).unwrap_or_else(|| unreachable!());
                    changing |= follow.absorb(&trailer);
                }
            }
        }

        Self { inner }
    }
}

#[cfg(test)]
mod test {
    use crate::grammar::Grammar;

    use super::*;

    fn symbol_set(symbols: &[Symbol]) -> SymbolSet {
        symbols.iter().copied().collect()
    }

    #[test]
    fn follow_of_nested_expression() {
        let mut b = Grammar::builder();
        let [expr, term, lparen, rparen, plus, num] = b.symbols();
        let eof = b.eof();
        b.rule(expr).is([term, plus, expr]).is([term]);
        b.rule(term).is([num]).is([lparen, expr, rparen]);
        let g = b.build(expr);
        let follows = g.follow_sets();

        assert_eq!(
            follows.get(expr).unwrap(),
            &symbol_set(&[eof, rparen])
        );
        assert_eq!(
            follows.get(term).unwrap(),
            &symbol_set(&[plus, eof, rparen])
        );
    }

    #[test]
    fn nullable_tail_inherits_lhs_follow() {
        let mut b = Grammar::builder();
        let [s, a, x, y] = b.symbols();
        let eps = b.epsilon();
        let eof = b.eof();
        b.rule(s).is([a, y]).is([x, a]);
        b.rule(a).is([x]).is([eps]);
        let g = b.build(s);
        let follows = g.follow_sets();

        // a is followed by y directly, and inherits eof from s where it
        // ends the rule
        assert_eq!(follows.get(a).unwrap(), &symbol_set(&[y, eof]));
    }
}

//! Random derivation from a grammar, for test seeding.

use rand::Rng;

use crate::error::{Error, Result};
use crate::scanner::Scanner;

use super::{Grammar, Symbol};

impl Grammar {
    /// Expands the goal symbol into a random sequence of terminals.
    ///
    /// Alternatives containing non-terminals lose weight as the
    /// derivation deepens, so recursive grammars terminate with
    /// probability one. Expansion runs on an explicit stack.
    pub fn random_sentence<R: Rng>(&self, rng: &mut R) -> Result<Vec<Symbol>> {
        let mut out = Vec::new();
        let mut stack: Vec<(Symbol, usize)> = vec![(self.goal(), 0)];
        while let Some((symbol, depth)) = stack.pop() {
            if symbol.is_epsilon() {
                continue;
            }
            if self.is_terminal(symbol) {
                out.push(symbol);
                continue;
            }
            let alternatives: Vec<&super::Rule> =
                self.rules_for(symbol).map(|(_, r)| r).collect();
            if alternatives.is_empty() {
                return Err(Error::UnknownSymbol(symbol.as_u32()));
            }
            let weights: Vec<f64> = alternatives
                .iter()
                .map(|r| {
                    let recursive = r.rhs().iter().any(|&s| self.is_non_terminal(s));
                    if recursive {
                        1.0 / (1.0 + depth as f64)
                    } else {
                        1.0
                    }
                })
                .collect();
            let total: f64 = weights.iter().sum();
            let mut pick = rng.gen::<f64>() * total;
            let mut chosen = alternatives.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if pick < *w {
                    chosen = i;
                    break;
                }
                pick -= w;
            }
            for &s in alternatives[chosen].rhs().iter().rev() {
                stack.push((s, depth + 1));
            }
        }
        Ok(out)
    }

    /// Renders a random sentence through the token types its terminals
    /// are bound to. The end marker is skipped; other unbound terminals
    /// fail the lookup.
    pub fn random_text<V, R: Rng>(
        &self,
        scanner: &Scanner<V>,
        separator: &str,
        rng: &mut R,
    ) -> Result<String> {
        let sentence = self.random_sentence(rng)?;
        let mut parts = Vec::with_capacity(sentence.len());
        for symbol in sentence {
            if symbol.is_eof() {
                continue;
            }
            let id = self.token_type_of(symbol)?;
            parts.push(scanner.token_type(id).random_lexeme(rng));
        }
        Ok(parts.join(separator))
    }
}

#[cfg(test)]
mod test {
    use crate::regex::RegEx;
    use crate::scanner::ScannerBuilder;
    use crate::token::TokenType;

    use super::super::Grammar;
    use super::*;

    #[test]
    fn recursive_grammars_terminate() {
        let mut b = Grammar::builder();
        let [expr, plus, num] = b.symbols();
        b.rule(expr).is([expr, plus, expr]).is([num]);
        let g = b.build(expr);

        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let sentence = g.random_sentence(&mut rng).unwrap();
            assert!(!sentence.is_empty());
            // a derivation is alternating num (+ num)*
            assert_eq!(sentence[0], num);
            assert_eq!(sentence.last(), Some(&num));
        }
    }

    #[test]
    fn unbound_terminals_fail_to_render() {
        let mut b = Grammar::builder();
        let [s, unbound] = b.symbols();
        b.rule(s).is([unbound, s]).is([unbound]);
        let g = b.build(s);
        let mut rng = rand::thread_rng();
        // the sentence itself is fine, rendering it is not
        assert!(g.random_sentence(&mut rng).is_ok());
        let err = g.random_text::<String, _>(&demo_scanner(), " ", &mut rng);
        assert!(err.is_err());
    }

    #[test]
    fn sentences_render_through_token_types() {
        let mut sb = ScannerBuilder::new();
        let int = sb.token(
            TokenType::new(
                "integer",
                RegEx::parse("[0-9]+").unwrap(),
                |s: &str| s.to_string(),
                |v: &String| v.clone(),
            )
            .unwrap(),
        );
        let plus_ty = sb.token(
            TokenType::new(
                "plus",
                RegEx::literal("+"),
                |s: &str| s.to_string(),
                |v: &String| v.clone(),
            )
            .unwrap(),
        );
        let scanner = sb.build();

        let mut b = Grammar::builder();
        let num = b.terminal(int);
        let plus = b.terminal(plus_ty);
        let [expr] = b.symbols();
        b.rule(expr).is([expr, plus, expr]).is([num]);
        let g = b.build(expr);

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let text = g.random_text(&scanner, "", &mut rng).unwrap();
            // everything generated scans back without error tokens
            let mut stream = crate::stream::TextStream::new(&text);
            for token in scanner.scan(&mut stream) {
                assert_ne!(token.type_id(), scanner.error_type(), "in {text:?}");
            }
        }
    }

    fn demo_scanner() -> crate::scanner::Scanner<String> {
        let mut sb = ScannerBuilder::new();
        sb.token(
            TokenType::new(
                "x",
                RegEx::literal("x"),
                |s: &str| s.to_string(),
                |v: &String| v.clone(),
            )
            .unwrap(),
        );
        sb.build()
    }
}

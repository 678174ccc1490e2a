//! SPDX license expressions.
//!
//! Grammar (AND binds tighter than OR):
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr ( "OR" and_expr )*
//! and_expr := atom ( "AND" atom )*
//! atom     := "(" expr ")" | id ( "WITH" id )?
//! ```
//! `WITH` exception clauses are recognised but only the base license is kept.
//! A `/` between identifiers is read as `OR`, as some ecosystems write it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseExpr {
    Id(String),
    And(Vec<LicenseExpr>),
    Or(Vec<LicenseExpr>),
}

impl LicenseExpr {
    /// Parse `raw`. Malformed input degrades gracefully: unbalanced
    /// parentheses are closed implicitly and dangling operators are dropped.
    /// An empty string parses to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.replace('/', " OR ");
        let tokens = tokenize(&normalized);
        ExprParser { tokens, pos: 0 }.parse_or()
    }

    /// Every license identifier in the expression, in source order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            LicenseExpr::Id(id) => out.push(id),
            LicenseExpr::And(parts) | LicenseExpr::Or(parts) => {
                for p in parts {
                    p.collect_ids(out);
                }
            }
        }
    }
}

/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
enum Token {
    Id(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            chars.next();
        } else if c == ')' {
            tokens.push(Token::RParen);
            chars.next();
        } else {
            let mut s = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == ')' {
                    break;
                }
                s.push(c);
                chars.next();
            }
            let token = match s.as_str() {
                "AND" | "and" => Token::And,
                "OR" | "or" => Token::Or,
                "WITH" | "with" => Token::With,
                _ => Token::Id(s),
            };
            tokens.push(token);
        }
    }
    tokens
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Option<LicenseExpr> {
        let mut parts: Vec<LicenseExpr> = self.parse_and().into_iter().collect();
        while matches!(self.peek(), Some(Token::Or)) {
            self.consume();
            parts.extend(self.parse_and());
        }
        collapse(parts, LicenseExpr::Or)
    }

    fn parse_and(&mut self) -> Option<LicenseExpr> {
        let mut parts: Vec<LicenseExpr> = self.parse_atom().into_iter().collect();
        while matches!(self.peek(), Some(Token::And)) {
            self.consume();
            parts.extend(self.parse_atom());
        }
        collapse(parts, LicenseExpr::And)
    }

    fn parse_atom(&mut self) -> Option<LicenseExpr> {
        match self.peek() {
            Some(Token::LParen) => {
                self.consume(); // '('
                let inner = self.parse_or();
                if matches!(self.peek(), Some(Token::RParen)) {
                    self.consume(); // ')'
                }
                inner
            }
            Some(Token::Id(_)) => {
                let Some(Token::Id(id)) = self.consume() else {
                    return None;
                };
                // Base license is what policy sees
                if matches!(self.peek(), Some(Token::With)) {
                    self.consume(); // WITH
                    self.consume(); // exception identifier
                }
                Some(LicenseExpr::Id(id))
            }
            Some(Token::RParen) | Some(Token::And) | Some(Token::Or) | Some(Token::With) => {
                // Stray token: skip it so the parse always makes progress
                self.consume();
                None
            }
            None => None,
        }
    }
}

fn collapse(mut parts: Vec<LicenseExpr>, wrap: fn(Vec<LicenseExpr>) -> LicenseExpr) -> Option<LicenseExpr> {
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(wrap(parts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LicenseExpr {
        LicenseExpr::Id(s.to_string())
    }

    #[test]
    fn test_single_id() {
        assert_eq!(LicenseExpr::parse("MIT"), Some(id("MIT")));
    }

    #[test]
    fn test_empty() {
        assert_eq!(LicenseExpr::parse("   "), None);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            LicenseExpr::parse("MIT OR GPL-3.0 AND BSD-3-Clause"),
            Some(LicenseExpr::Or(vec![
                id("MIT"),
                LicenseExpr::And(vec![id("GPL-3.0"), id("BSD-3-Clause")]),
            ]))
        );
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            LicenseExpr::parse("(Apache-2.0 OR MIT) AND BSD-3-Clause"),
            Some(LicenseExpr::And(vec![
                LicenseExpr::Or(vec![id("Apache-2.0"), id("MIT")]),
                id("BSD-3-Clause"),
            ]))
        );
    }

    #[test]
    fn test_slash_separator() {
        assert_eq!(
            LicenseExpr::parse("MIT/Apache-2.0"),
            Some(LicenseExpr::Or(vec![id("MIT"), id("Apache-2.0")]))
        );
    }

    #[test]
    fn test_with_exception_dropped() {
        assert_eq!(
            LicenseExpr::parse("GPL-2.0 WITH Classpath-exception-2.0"),
            Some(id("GPL-2.0"))
        );
    }

    #[test]
    fn test_malformed_input_terminates() {
        assert_eq!(LicenseExpr::parse("MIT AND"), Some(id("MIT")));
        assert_eq!(LicenseExpr::parse(") OR MIT"), Some(id("MIT")));
        assert_eq!(LicenseExpr::parse("(MIT"), Some(id("MIT")));
    }

    #[test]
    fn test_ids_in_order() {
        let expr = LicenseExpr::parse("(MIT OR Apache-2.0) AND Zlib").unwrap();
        assert_eq!(expr.ids(), vec!["MIT", "Apache-2.0", "Zlib"]);
    }
}

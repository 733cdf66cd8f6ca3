//! Dependency expressions: `a >> [b, c] >> d`, `e << f`.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SpecError;

static OPERATOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn operator_regex() -> &'static Regex {
    OPERATOR_REGEX
        .get_or_init(|| Regex::new(r">>|<<|\[|\]|,").expect("OPERATOR_REGEX is valid"))
}

/// Identifiers mentioned in an expression, with operators and brackets stripped.
pub fn referenced_ids(expression: &str) -> Vec<String> {
    operator_regex()
        .replace_all(expression, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Id(String),
    Shr,
    Shl,
    Open,
    Close,
    Comma,
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' | '\r' => return Err("line break inside expression".to_string()),
            c if c.is_whitespace() => {}
            '[' => tokens.push(Token::Open),
            ']' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '>' | '<' => {
                if chars.next_if_eq(&c).is_none() {
                    return Err(format!("lone '{c}', expected '{c}{c}'"));
                }
                tokens.push(if c == '>' { Token::Shr } else { Token::Shl });
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut id = c.to_string();
                while let Some(n) = chars.next_if(|n| n.is_alphanumeric() || *n == '_') {
                    id.push(n);
                }
                tokens.push(Token::Id(id));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

/// Parses one expression into directed edges `(upstream, downstream)`.
pub fn parse_edges(expression: &str) -> Result<Vec<(String, String)>, SpecError> {
    let malformed = |reason: String| SpecError::MalformedDependency {
        expression: expression.to_string(),
        reason,
    };

    let tokens = tokenize(expression).map_err(malformed)?;
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut pos = 0;
    let mut edges = Vec::new();
    let mut left = parse_operand(&tokens, &mut pos).map_err(malformed)?;

    while pos < tokens.len() {
        let op = tokens[pos].clone();
        if op != Token::Shr && op != Token::Shl {
            return Err(malformed(format!("expected '>>' or '<<' at token {}", pos + 1)));
        }
        pos += 1;
        let right = parse_operand(&tokens, &mut pos).map_err(malformed)?;
        for l in &left {
            for r in &right {
                if op == Token::Shr {
                    edges.push((l.clone(), r.clone()));
                } else {
                    edges.push((r.clone(), l.clone()));
                }
            }
        }
        left = right;
    }

    Ok(edges)
}

fn parse_operand(tokens: &[Token], pos: &mut usize) -> Result<Vec<String>, String> {
    match tokens.get(*pos) {
        Some(Token::Id(id)) => {
            *pos += 1;
            Ok(vec![id.clone()])
        }
        Some(Token::Open) => {
            *pos += 1;
            let mut group = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(Token::Id(id)) => {
                        group.push(id.clone());
                        *pos += 1;
                    }
                    _ => return Err("expected a task id inside '[...]'".to_string()),
                }
                match tokens.get(*pos) {
                    Some(Token::Comma) => {
                        *pos += 1;
                        // trailing comma, as in a Python list
                        if tokens.get(*pos) == Some(&Token::Close) {
                            *pos += 1;
                            return Ok(group);
                        }
                    }
                    Some(Token::Close) => {
                        *pos += 1;
                        return Ok(group);
                    }
                    _ => return Err("unterminated group, expected ',' or ']'".to_string()),
                }
            }
        }
        Some(_) => Err(format!("expected a task id or '[' at token {}", *pos + 1)),
        None => Err("expression ends with an operator".to_string()),
    }
}

/// Directed graph built from all dependency expressions.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// upstream -> downstream ids
    edges: HashMap<String, Vec<String>>,
    insertion_order: Vec<String>,
}

impl DependencyGraph {
    pub fn from_expressions(expressions: &[String]) -> Result<Self, SpecError> {
        let mut graph = Self::default();
        for expression in expressions {
            for (from, to) in parse_edges(expression)? {
                graph.add_edge(from, to);
            }
        }
        Ok(graph)
    }

    fn add_edge(&mut self, from: String, to: String) {
        for id in [&from, &to] {
            if !self.insertion_order.contains(id) {
                self.insertion_order.push(id.clone());
            }
        }
        let targets = self.edges.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        match self.detect_cycle() {
            Some(cycle) => Err(SpecError::DependencyCycle(cycle)),
            None => Ok(()),
        }
    }

    /// Detect circular dependencies using DFS, in insertion order so the
    /// reported path is stable.
    fn detect_cycle(&self) -> Option<String> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for node in &self.insertion_order {
            if !visited.contains(node) && self.dfs_cycle(node, &mut visited, &mut stack) {
                return Some(stack.join(" -> "));
            }
        }

        None
    }

    fn dfs_cycle(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> bool {
        visited.insert(node.to_string());
        stack.push(node.to_string());

        if let Some(targets) = self.edges.get(node) {
            for next in targets {
                if let Some(pos) = stack.iter().position(|x| x == next) {
                    stack.push(next.clone());
                    *stack = stack[pos..].to_vec();
                    return true;
                }

                if !visited.contains(next) && self.dfs_cycle(next, visited, stack) {
                    return true;
                }
            }
        }

        stack.pop();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(edges: &[(String, String)]) -> Vec<(&str, &str)> {
        edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect()
    }

    #[test]
    fn referenced_ids_strip_operators() {
        assert_eq!(
            referenced_ids("t1>>t2>>[t31, t32]>>t4"),
            vec!["t1", "t2", "t31", "t32", "t4"]
        );
        assert_eq!(referenced_ids("a << b"), vec!["a", "b"]);
    }

    #[test]
    fn groups_fan_out_and_in() {
        let edges = parse_edges("a >> [b, c] >> d").unwrap();
        assert_eq!(
            pairs(&edges),
            vec![("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]
        );
    }

    #[test]
    fn reverse_operator_flips_direction() {
        let edges = parse_edges("load << extract").unwrap();
        assert_eq!(pairs(&edges), vec![("extract", "load")]);
    }

    #[test]
    fn single_id_and_blank_lines_have_no_edges() {
        assert!(parse_edges("lonely").unwrap().is_empty());
        assert!(parse_edges("   ").unwrap().is_empty());
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for bad in ["a >>", "a > b", "[a, b", "a b", ">> a", "a >> []", "a >> b;"] {
            assert!(
                matches!(parse_edges(bad), Err(SpecError::MalformedDependency { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn group_accepts_trailing_comma() {
        let edges = parse_edges("load_orders >> [copy_orders, export_vm,]").unwrap();
        assert_eq!(
            pairs(&edges),
            vec![("load_orders", "copy_orders"), ("load_orders", "export_vm")]
        );
        assert!(parse_edges("a >> [,]").is_err());
        assert!(parse_edges("a >> [b,,]").is_err());
    }

    #[test]
    fn line_breaks_are_rejected() {
        for bad in ["create_orders >>\nload_orders", "a >> b\r", "a\n"] {
            match parse_edges(bad) {
                Err(SpecError::MalformedDependency { reason, .. }) => {
                    assert!(reason.contains("line break"), "{reason}")
                }
                other => panic!("{bad:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let exprs = vec!["a >> b >> c".to_string(), "c >> a".to_string()];
        let graph = DependencyGraph::from_expressions(&exprs).unwrap();
        match graph.validate() {
            Err(SpecError::DependencyCycle(path)) => assert_eq!(path, "a -> b -> c -> a"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn diamond_is_acyclic() {
        let exprs = vec!["a >> [b, c]".to_string(), "[b, c] >> d".to_string()];
        let graph = DependencyGraph::from_expressions(&exprs).unwrap();
        assert_eq!(graph.edge_count(), 4);
        graph.validate().unwrap();
    }
}

use super::{SyntaxIssue, ValidationResult};
use std::sync::{Mutex, PoisonError};
use tree_sitter::{Node, Parser};

/// Longest source excerpt quoted back in a syntax error message.
const MAX_EXCERPT_CHARS: usize = 40;

/// Parse-only check run before any script is executed.
///
/// Implementations must not evaluate the code or touch the filesystem,
/// network or process table. They only report `Valid` or `SyntaxError`;
/// refusals come from the safety gate.
pub trait ScriptValidator: Send + Sync {
    /// Grammar name, used in logs.
    fn language(&self) -> &str;

    fn validate(&self, code: &str) -> ValidationResult;
}

/// Python syntax check backed by the tree-sitter grammar.
pub struct PythonValidator {
    parser: Mutex<Parser>,
}

impl PythonValidator {
    pub fn new() -> anyhow::Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| anyhow::anyhow!("failed to load Python grammar: {e}"))?;
        Ok(Self {
            parser: Mutex::new(parser),
        })
    }
}

impl ScriptValidator for PythonValidator {
    fn language(&self) -> &str {
        "python"
    }

    fn validate(&self, code: &str) -> ValidationResult {
        let tree = {
            let mut parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
            parser.parse(code, None)
        };

        let Some(tree) = tree else {
            return ValidationResult::SyntaxError(SyntaxIssue {
                line: 1,
                column: 1,
                message: "parser produced no syntax tree".into(),
            });
        };

        let root = tree.root_node();
        let issue = if root.has_error() {
            first_error(root).map_or_else(
                || SyntaxIssue {
                    line: 1,
                    column: 1,
                    message: "invalid syntax".into(),
                },
                |node| describe(node, code),
            )
        } else {
            match first_rejected(root, code) {
                Some(issue) => issue,
                None => return ValidationResult::Valid,
            }
        };
        tracing::debug!(line = issue.line, column = issue.column, "syntax check failed");
        ValidationResult::SyntaxError(issue)
    }
}

/// First ERROR or MISSING node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// The grammar still accepts Python 2 forms and recovers from a missing
/// indented block without an ERROR node. Python 3 rejects all of these.
fn first_rejected(root: Node<'_>, source: &str) -> Option<SyntaxIssue> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(issue) = rejection(node, source) {
            return Some(issue);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn rejection(node: Node<'_>, source: &str) -> Option<SyntaxIssue> {
    let text = || node.utf8_text(source.as_bytes()).unwrap_or_default();
    let message = match node.kind() {
        "print_statement" => "Missing parentheses in call to 'print'".to_string(),
        "exec_statement" => "Missing parentheses in call to 'exec'".to_string(),
        "string_start" if text().contains('`') => {
            "backquotes are not supported, use repr()".to_string()
        }
        "integer" => integer_problem(text())?.to_string(),
        "for_in_clause" => {
            let mut cursor = node.walk();
            let iterables = node.children_by_field_name("right", &mut cursor).count();
            if iterables < 2 {
                return None;
            }
            let in_call = node
                .parent()
                .filter(|p| p.kind() == "generator_expression")
                .and_then(|p| p.parent())
                .is_some_and(|p| p.kind() == "call");
            if in_call {
                "Generator expression must be parenthesized".to_string()
            } else {
                "invalid syntax: the iterable after `in` must be parenthesized".to_string()
            }
        }
        "block" => return unindented_block(node),
        _ => return None,
    };
    Some(at(node, message))
}

fn integer_problem(literal: &str) -> Option<&'static str> {
    let lower = literal.to_ascii_lowercase();
    if ["0x", "0o", "0b"].iter().any(|prefix| lower.starts_with(prefix)) {
        return lower
            .ends_with('l')
            .then_some("long integer suffix is not supported");
    }
    if lower.ends_with('l') {
        return Some("long integer suffix is not supported");
    }
    if lower.ends_with('j') {
        return None;
    }
    let digits: String = lower.chars().filter(|c| *c != '_').collect();
    (digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0')).then_some(
        "leading zeros in decimal integer literals are not permitted; use an 0o prefix for octal integers",
    )
}

/// A compound statement whose body is empty or not indented past its header.
fn unindented_block(block: Node<'_>) -> Option<SyntaxIssue> {
    let header = block.parent()?;
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");

    let misplaced = match first {
        None => true,
        Some(statement) => {
            let start = statement.start_position();
            start.row > header.start_position().row
                && start.column <= header.start_position().column
        }
    };
    if !misplaced {
        return None;
    }
    Some(SyntaxIssue {
        line: header.start_position().row + 2,
        column: 1,
        message: format!(
            "expected an indented block after the statement on line {}",
            header.start_position().row + 1
        ),
    })
}

fn at(node: Node<'_>, message: String) -> SyntaxIssue {
    let position = node.start_position();
    SyntaxIssue {
        line: position.row + 1,
        column: position.column + 1,
        message,
    }
}

fn describe(node: Node<'_>, source: &str) -> SyntaxIssue {
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
        let excerpt = text.lines().next().unwrap_or_default().trim();
        if excerpt.is_empty() {
            "invalid syntax".to_string()
        } else {
            let excerpt: String = excerpt.chars().take(MAX_EXCERPT_CHARS).collect();
            format!("invalid syntax near `{excerpt}`")
        }
    };

    SyntaxIssue {
        line: position.row + 1,
        column: position.column + 1,
        message,
    }
}

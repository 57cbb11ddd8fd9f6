//! # go.mod Parsing
//!
//! A reader for the subset of `go.mod` syntax needed to work with replace
//! directives. The whole file is validated (every line must be a known
//! directive, blocks must be balanced, strings must be terminated) so that a
//! malformed manifest is rejected rather than half-read, but only `module` and
//! `replace` directives are kept in the parsed result.
//!
//! ## Syntax
//!
//! ```text
//! module example.com/app
//!
//! replace github.com/foo/bar => github.com/fork/bar v1.0.0 // from: example.com/dep
//!
//! replace (
//!     github.com/baz v1.2.0 => ../baz
//!     "github.com/quoted" => github.com/other v0.3.0
//! )
//! ```
//!
//! Tokens are separated by whitespace. Strings may be interpreted (`"..."`)
//! or raw (`` `...` ``). A `//` outside a string starts a comment that runs to
//! the end of the line; a comment after a directive on the same line is that
//! directive's trailing comment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::is_local_path;

/// Directive verbs accepted at the top level of a go.mod file.
const KNOWN_VERBS: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

/// A parsed go.mod file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    /// The module path declared by the `module` directive, if present.
    pub module: Option<String>,
    /// Replace directives in declaration order.
    pub replaces: Vec<ReplaceDirective>,
}

/// A single `replace` directive as it appears in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceDirective {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    pub new_version: Option<String>,
    /// 1-based line number of the directive.
    pub line: usize,
    /// Text of the trailing `//` comment, without the slashes, trimmed.
    pub comment: Option<String>,
}

/// Read and parse the go.mod file at `path`.
pub fn parse_file(path: &Path) -> Result<ModFile> {
    let content = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &content)
}

/// Parse go.mod `content`. `path` is only used in error messages.
pub fn parse(path: &Path, content: &str) -> Result<ModFile> {
    let mut file = ModFile::default();
    // Verb of the block currently open, with the line it was opened on
    let mut block: Option<(String, usize)> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let syntax_error = |message: String| Error::ManifestParse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        };

        let (code, comment) = split_comment(raw_line);
        let tokens = tokenize(code).map_err(syntax_error)?;
        if tokens.is_empty() {
            continue;
        }

        if let Some((verb, _)) = block.clone() {
            if tokens.len() == 1 && tokens[0].is_delim(')') {
                block = None;
                continue;
            }
            if tokens.iter().any(|t| t.is_delim('(')) {
                return Err(syntax_error("unexpected '(' inside block".to_string()));
            }
            handle_directive(&mut file, &verb, &tokens, line_no, comment)
                .map_err(syntax_error)?;
            continue;
        }

        let verb = match &tokens[0] {
            Token::Word(word) => word.clone(),
            Token::Delim(c) => return Err(syntax_error(format!("unexpected '{}'", c))),
        };
        if !KNOWN_VERBS.contains(&verb.as_str()) {
            return Err(syntax_error(format!("unknown directive: {}", verb)));
        }

        let rest = &tokens[1..];
        match rest {
            [open] if open.is_delim('(') => {
                block = Some((verb, line_no));
            }
            [open, close] if open.is_delim('(') && close.is_delim(')') => {}
            _ => {
                if rest.iter().any(|t| t.is_delim('(') || t.is_delim(')')) {
                    return Err(syntax_error(format!("unexpected parenthesis in {}", verb)));
                }
                handle_directive(&mut file, &verb, rest, line_no, comment)
                    .map_err(syntax_error)?;
            }
        }
    }

    if let Some((verb, opened_at)) = block {
        return Err(Error::ManifestParse {
            path: path.to_path_buf(),
            line: opened_at,
            message: format!("unclosed {} block", verb),
        });
    }

    log::trace!(
        "parsed {}: {} replace directive(s)",
        path.display(),
        file.replaces.len()
    );
    Ok(file)
}

/// Split a line into its code and its `//` comment.
///
/// Returns the code part (everything before the comment, untrimmed) and the
/// comment text without the leading slashes, trimmed. A `//` inside a quoted
/// string does not start a comment.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'`' => quote = Some(b),
            None if b == b'/' && bytes.get(i + 1) == Some(&b'/') => {
                return (&line[..i], Some(line[i + 2..].trim()));
            }
            None => {}
        }
        i += 1;
    }
    (line, None)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Delim(char),
}

impl Token {
    fn is_delim(&self, c: char) -> bool {
        matches!(self, Token::Delim(d) if *d == c)
    }
}

fn tokenize(code: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = code.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if matches!(c, '(' | ')' | '[' | ']' | ',') {
            chars.next();
            tokens.push(Token::Delim(c));
        } else if c == '"' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some(escaped) => value.push(escaped),
                        None => return Err("unterminated quoted string".to_string()),
                    },
                    Some(other) => value.push(other),
                    None => return Err("unterminated quoted string".to_string()),
                }
            }
            tokens.push(Token::Word(value));
        } else if c == '`' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('`') => break,
                    Some(other) => value.push(other),
                    None => return Err("unterminated raw string".to_string()),
                }
            }
            tokens.push(Token::Word(value));
        } else if c == '{' || c == '}' {
            return Err(format!("unexpected input character '{}'", c));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ',' | '"' | '`') {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn words(tokens: &[Token]) -> std::result::Result<Vec<String>, String> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Word(word) => Ok(word.clone()),
            Token::Delim(c) => Err(format!("unexpected '{}'", c)),
        })
        .collect()
}

fn handle_directive(
    file: &mut ModFile,
    verb: &str,
    tokens: &[Token],
    line: usize,
    comment: Option<&str>,
) -> std::result::Result<(), String> {
    // Version ranges like `retract [v1.0.0, v1.0.1]` are the only place
    // brackets and commas may appear
    if verb != "retract" && tokens.iter().any(|t| matches!(t, Token::Delim(_))) {
        return Err(format!("unexpected punctuation in {} directive", verb));
    }

    match verb {
        "module" => {
            let args = words(tokens)?;
            if args.len() != 1 {
                return Err("usage: module module/path".to_string());
            }
            file.module = Some(args[0].clone());
        }
        "replace" => {
            let args = words(tokens)?;
            let mut directive = parse_replace(&args)?;
            directive.line = line;
            directive.comment = comment.filter(|c| !c.is_empty()).map(str::to_string);
            file.replaces.push(directive);
        }
        _ => {
            if tokens.is_empty() {
                return Err(format!("{} directive has no arguments", verb));
            }
        }
    }
    Ok(())
}

fn parse_replace(args: &[String]) -> std::result::Result<ReplaceDirective, String> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory";

    let arrow = match args.iter().position(|a| a == "=>") {
        Some(arrow @ (1 | 2)) => arrow,
        _ => return Err(USAGE.to_string()),
    };
    let old_path = args[0].clone();
    let old_version = if arrow == 2 {
        Some(args[1].clone())
    } else {
        None
    };

    let (new_path, new_version) = match &args[arrow + 1..] {
        [new_path] => {
            if !is_local_path(new_path) {
                return Err(format!(
                    "replacement module without version must be directory path (rooted or starting with ./ or ../): {}",
                    new_path
                ));
            }
            (new_path.clone(), None)
        }
        [new_path, new_version] => {
            if is_local_path(new_path) {
                return Err(format!(
                    "replacement module directory path must not have version: {}",
                    new_path
                ));
            }
            (new_path.clone(), Some(new_version.clone()))
        }
        _ => return Err(USAGE.to_string()),
    };

    Ok(ReplaceDirective {
        old_path,
        old_version,
        new_path,
        new_version,
        line: 0,
        comment: None,
    })
}

/// Path of the go.mod file inside a module directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join("go.mod")
}

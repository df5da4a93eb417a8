//! Glob pattern matching for request paths.
//!
//! # Responsibilities
//! - Compile glob-style path patterns once, at startup
//! - Match a request path (no query string) against a compiled pattern
//!
//! # Design Decisions
//! - `*` matches zero or more characters within one path segment
//! - `?` matches exactly one character within one path segment
//! - `**` as a whole segment matches zero or more whole segments
//! - Literal patterns compare by string equality
//! - Path matching is case-sensitive; trailing slashes are significant
//! - No regex to keep matching linear in practice

use thiserror::Error;

/// Reasons a pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern must start with '/'")]
    MissingLeadingSlash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`: zero or more whole segments.
    Globstar,
    Exact(String),
    Wild(Vec<Token>),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            return Segment::Globstar;
        }
        if !raw.contains(['*', '?']) {
            return Segment::Exact(raw.to_string());
        }

        let mut tokens = Vec::with_capacity(raw.len());
        for c in raw.chars() {
            let token = match c {
                '*' => Token::AnyRun,
                '?' => Token::AnyChar,
                other => Token::Literal(other),
            };
            // Collapse runs of stars, e.g. `a**b` inside a segment.
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Segment::Wild(tokens)
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Globstar => true,
            Segment::Exact(expected) => expected == segment,
            Segment::Wild(tokens) => wildcard_match(tokens, segment),
        }
    }
}

/// Single-segment wildcard match with star backtracking.
fn wildcard_match(tokens: &[Token], segment: &str) -> bool {
    let chars: Vec<char> = segment.chars().collect();
    let (mut t, mut c) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while c < chars.len() {
        match tokens.get(t) {
            Some(Token::AnyRun) => {
                backtrack = Some((t, c));
                t += 1;
            }
            Some(Token::AnyChar) => {
                t += 1;
                c += 1;
            }
            Some(Token::Literal(l)) if *l == chars[c] => {
                t += 1;
                c += 1;
            }
            _ => match backtrack {
                // Let the last star absorb one more character.
                Some((star_t, star_c)) => {
                    t = star_t + 1;
                    c = star_c + 1;
                    backtrack = Some((star_t, star_c + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|tok| *tok == Token::AnyRun)
}

/// A compiled glob path pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    segments: Vec<Segment>,
    literal: bool,
}

impl GlobPattern {
    /// Compile a pattern such as `/auth/**` or `/invitations/*`.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }

        let segments: Vec<Segment> = pattern.split('/').map(Segment::parse).collect();
        let literal = segments.iter().all(|s| matches!(s, Segment::Exact(_)));

        Ok(Self {
            source: pattern.to_string(),
            segments,
            literal,
        })
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        if self.literal {
            return self.source == path;
        }
        let parts: Vec<&str> = path.split('/').collect();
        match_segments(&self.segments, &parts)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Globstar, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

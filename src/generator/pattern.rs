//! Strings matching a regular expression.
//!
//! The pattern is parsed once with `regex-syntax`; each value is produced by
//! walking the HIR and making a random choice at every class, alternation and
//! repetition. Character classes are narrowed to printable ASCII when they
//! overlap it, so `.` and `\w` yield readable output.

use super::Generator;
use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::value::Value;
use rand::Rng;
use regex_syntax::hir::{Class, Hir, HirKind};
use tracing::warn;

/// Used when the configured pattern does not parse
pub const FALLBACK_PATTERN: &str = "[a-zA-Z0-9]{10}";

/// Extra repetitions allowed for unbounded repeats (`*`, `+`, `{n,}`)
const MAX_EXTRA_REPEAT: u32 = 8;

const PRINTABLE: (u32, u32) = (0x20, 0x7e);

#[derive(Debug, Clone)]
pub struct PatternGenerator {
    pattern: String,
    hir: Hir,
}

impl PatternGenerator {
    /// Compile `pattern`, falling back to [`FALLBACK_PATTERN`] if it is
    /// not a valid regular expression.
    pub fn new(pattern: &str) -> Self {
        match regex_syntax::parse(pattern) {
            Ok(hir) => Self {
                pattern: pattern.to_string(),
                hir,
            },
            Err(e) => {
                warn!(pattern, error = %e, "invalid pattern, using fallback");
                Self::fallback()
            }
        }
    }

    fn fallback() -> Self {
        let hir = regex_syntax::parse(FALLBACK_PATTERN).unwrap_or_else(|_| Hir::empty());
        Self {
            pattern: FALLBACK_PATTERN.to_string(),
            hir,
        }
    }

    /// The pattern actually in use
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Produce one matching string using `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        emit(&self.hir, rng, &mut out);
        out
    }
}

impl Generator for PatternGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let mut rng = ctx.seeded_rng();
        Ok(Value::Text(self.sample(&mut rng)))
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

fn emit<R: Rng + ?Sized>(hir: &Hir, rng: &mut R, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => out.push_str(&String::from_utf8_lossy(&lit.0)),
        HirKind::Class(Class::Unicode(class)) => {
            let ranges: Vec<(u32, u32)> = class
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect();
            if let Some(c) = pick_char(&ranges, rng) {
                out.push(c);
            }
        }
        HirKind::Class(Class::Bytes(class)) => {
            let ranges: Vec<(u32, u32)> = class
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect();
            if let Some(c) = pick_char(&ranges, rng) {
                out.push(c);
            }
        }
        HirKind::Repetition(rep) => {
            let max = rep
                .max
                .unwrap_or_else(|| rep.min.saturating_add(MAX_EXTRA_REPEAT));
            let count = if max > rep.min {
                rng.random_range(rep.min..=max)
            } else {
                rep.min
            };
            for _ in 0..count {
                emit(&rep.sub, rng, out);
            }
        }
        HirKind::Capture(cap) => emit(&cap.sub, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                emit(part, rng, out);
            }
        }
        HirKind::Alternation(branches) => {
            if !branches.is_empty() {
                let idx = rng.random_range(0..branches.len());
                emit(&branches[idx], rng, out);
            }
        }
    }
}

/// Pick a character from inclusive code point ranges, preferring the part
/// of the class that is printable ASCII.
fn pick_char<R: Rng + ?Sized>(ranges: &[(u32, u32)], rng: &mut R) -> Option<char> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(lo, hi)| {
            let lo = lo.max(PRINTABLE.0);
            let hi = hi.min(PRINTABLE.1);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();
    let pool = if printable.is_empty() {
        ranges
    } else {
        &printable[..]
    };

    let total: u64 = pool.iter().map(|&(lo, hi)| (hi - lo) as u64 + 1).sum();
    if total == 0 {
        return None;
    }
    let mut idx = rng.random_range(0..total);
    for &(lo, hi) in pool {
        let size = (hi - lo) as u64 + 1;
        if idx < size {
            return char::from_u32(lo + idx as u32);
        }
        idx -= size;
    }
    None
}

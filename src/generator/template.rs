//! Placeholder templates: `{{year}}`, `{{seq}}`, `{{seq:6}}`, `{{rand:8}}`.

use super::basic::random_alphanumeric;
use super::Generator;
use crate::context::{CounterKind, GenerationContext};
use crate::error::{ConfigError, GenerationError};
use crate::value::Value;
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

/// Largest width accepted by `{{seq:N}}` and `{{rand:N}}`.
pub const MAX_PLACEHOLDER_WIDTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Year,
    Seq { width: usize },
    Rand { len: usize },
}

/// Expands a template string once per value.
///
/// `{{seq}}` is a per-column counter advanced once per generated value;
/// all `{{seq}}` occurrences within one value share it. Unknown
/// placeholders are kept verbatim. Widths above
/// [`MAX_PLACEHOLDER_WIDTH`] are a config error.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    template: String,
    segments: Vec<Segment>,
    uses_seq: bool,
}

impl TemplateGenerator {
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(template[last..whole.start()].to_string()));
            }
            segments.push(parse_placeholder(inner.as_str().trim(), whole.as_str())?);
            last = whole.end();
        }
        if last < template.len() {
            segments.push(Segment::Literal(template[last..].to_string()));
        }

        let uses_seq = segments.iter().any(|s| matches!(s, Segment::Seq { .. }));
        Ok(Self {
            template: template.to_string(),
            segments,
            uses_seq,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

fn parse_placeholder(inner: &str, raw: &str) -> Result<Segment, ConfigError> {
    let (name, arg) = match inner.split_once(':') {
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (inner, None),
    };
    let number = |arg: &str| match arg.parse::<usize>() {
        Ok(n) if n <= MAX_PLACEHOLDER_WIDTH => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            generator: "template",
            key: "template",
            message: format!(
                "placeholder {} exceeds the maximum width of {}",
                raw, MAX_PLACEHOLDER_WIDTH
            ),
        }),
        Err(_) => Err(ConfigError::InvalidValue {
            generator: "template",
            key: "template",
            message: format!("placeholder {} needs a non-negative integer", raw),
        }),
    };
    let segment = match (name, arg) {
        ("year", None) => Segment::Year,
        ("seq", None) => Segment::Seq { width: 0 },
        ("seq", Some(width)) => Segment::Seq {
            width: number(width)?,
        },
        ("rand", Some(len)) => Segment::Rand { len: number(len)? },
        _ => Segment::Literal(raw.to_string()),
    };
    Ok(segment)
}

impl Generator for TemplateGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let seq = if self.uses_seq {
            ctx.next_counter(CounterKind::Template)
        } else {
            0
        };
        let year = ctx.reference_time().year();

        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Year => out.push_str(&year.to_string()),
                Segment::Seq { width } => out.push_str(&format!("{:0width$}", seq, width = *width)),
                Segment::Rand { len } => out.push_str(&random_alphanumeric(ctx.rng(), *len)),
            }
        }
        Ok(Value::Text(out))
    }

    fn name(&self) -> &str {
        "template"
    }
}

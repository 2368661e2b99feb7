//! Conditional inclusion of candidate terms.

use crate::error::{BuildError, BuildResult};

/// An option applied to each candidate WHERE/SET term or insert column.
///
/// Every option runs, left to right. The term is kept only when no option
/// vetoes it. The first error aborts the chain and becomes the builder's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opt {
    /// Drop the term when its value is zero.
    SkipZero,
    /// Fail the build when the value is zero.
    Require,
    /// Qualify the column with a table alias: `id = ?` becomes `u.id = ?`.
    Prefix(String),
}

impl Opt {
    pub fn prefix(alias: impl Into<String>) -> Self {
        Opt::Prefix(alias.into())
    }
}

/// Run the option chain over `text`. `Ok(None)` means the term was vetoed.
pub(crate) fn apply_options(text: &str, zero: bool, opts: &[Opt]) -> BuildResult<Option<String>> {
    let mut text = text.to_string();
    let mut include = true;
    for opt in opts {
        match opt {
            Opt::SkipZero => {
                if zero {
                    include = false;
                }
            }
            Opt::Require => {
                if zero {
                    return Err(BuildError::Required {
                        column: column_of(&text).to_string(),
                    });
                }
            }
            Opt::Prefix(alias) => {
                let alias = alias.trim_end_matches('.');
                if !alias.is_empty() {
                    text = format!("{alias}.{text}");
                }
            }
        }
    }
    Ok(include.then_some(text))
}

fn column_of(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or(text)
}

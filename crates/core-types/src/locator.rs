//! Locators and parameterizable locator templates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selector strategies supported by the driver port.
///
/// The standard set is extended with `Url`, used by page objects whose
/// "locator" is the page address itself rather than a node in the document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Css,
    XPath,
    Id,
    Name,
    TagName,
    LinkText,
    Url,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::TagName => "tag name",
            Strategy::LinkText => "link text",
            Strategy::Url => "url",
        };
        f.write_str(label)
    }
}

/// A concrete `(strategy, selector)` pair, immutable once built.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    selector: String,
}

impl Locator {
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy, self.selector)
    }
}

/// Errors raised while turning a template into a concrete [`Locator`].
///
/// These are configuration mistakes: they surface at handle construction and
/// are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("locator template `{template}` still has unbound placeholders")]
    Unbound { template: String },

    #[error("locator template `{template}` has unbalanced braces")]
    Malformed { template: String },

    #[error("no argument for placeholder `{{{placeholder}}}` in `{template}`")]
    MissingArgument {
        placeholder: String,
        template: String,
    },
}

enum Slot<'a> {
    Positional,
    Indexed(usize),
    Named(&'a str),
}

/// A `(strategy, selector-template)` pair with `{}`/`{0}`/`{name}`
/// placeholders, bound to concrete arguments before use.
///
/// `{{` and `}}` escape literal braces, as in the usual format-string rules.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LocatorTemplate {
    strategy: Strategy,
    template: String,
}

impl LocatorTemplate {
    pub fn new(strategy: Strategy, template: impl Into<String>) -> Self {
        Self {
            strategy,
            template: template.into(),
        }
    }

    pub fn xpath(template: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, template)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Bind positional placeholders (`{}` or `{0}`-style) in order.
    pub fn bind(&self, args: &[&str]) -> Result<Locator, LocatorError> {
        let mut next = 0usize;
        let selector = self.render(|slot| match slot {
            Slot::Positional => {
                let idx = next;
                next += 1;
                args.get(idx)
                    .map(|s| s.to_string())
                    .ok_or_else(|| idx.to_string())
            }
            Slot::Indexed(idx) => args
                .get(idx)
                .map(|s| s.to_string())
                .ok_or_else(|| idx.to_string()),
            Slot::Named(key) => Err(key.to_string()),
        })?;
        Ok(Locator::new(self.strategy, selector))
    }

    /// Bind named placeholders (`{row}`-style) from key/value pairs.
    pub fn bind_named(&self, pairs: &[(&str, &str)]) -> Result<Locator, LocatorError> {
        let selector = self.render(|slot| match slot {
            Slot::Named(key) => pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .ok_or_else(|| key.to_string()),
            Slot::Positional => Err(String::new()),
            Slot::Indexed(idx) => Err(idx.to_string()),
        })?;
        Ok(Locator::new(self.strategy, selector))
    }

    /// Convert a template that carries no placeholders at all.
    pub fn fixed(&self) -> Result<Locator, LocatorError> {
        let template = &self.template;
        let selector = self.render(|_| {
            // any placeholder sighting means the template needed binding
            Err(String::new())
        });
        match selector {
            Ok(selector) => Ok(Locator::new(self.strategy, selector)),
            Err(LocatorError::MissingArgument { .. }) => Err(LocatorError::Unbound {
                template: template.clone(),
            }),
            Err(other) => Err(other),
        }
    }

    fn render(
        &self,
        mut fill: impl FnMut(Slot<'_>) -> Result<String, String>,
    ) -> Result<String, LocatorError> {
        let template = &self.template;
        let mut out = String::with_capacity(template.len());
        let mut chars = template.char_indices().peekable();

        while let Some((start, ch)) = chars.next() {
            match ch {
                '{' => {
                    if matches!(chars.peek(), Some((_, '{'))) {
                        chars.next();
                        out.push('{');
                        continue;
                    }
                    let mut end = None;
                    for (idx, inner) in chars.by_ref() {
                        if inner == '}' {
                            end = Some(idx);
                            break;
                        }
                    }
                    let end = end.ok_or_else(|| LocatorError::Malformed {
                        template: template.clone(),
                    })?;
                    let key = &template[start + 1..end];
                    let slot = if key.is_empty() {
                        Slot::Positional
                    } else if let Ok(idx) = key.parse::<usize>() {
                        Slot::Indexed(idx)
                    } else {
                        Slot::Named(key)
                    };
                    let value = fill(slot).map_err(|placeholder| {
                        LocatorError::MissingArgument {
                            placeholder,
                            template: template.clone(),
                        }
                    })?;
                    out.push_str(&value);
                }
                '}' => {
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                        out.push('}');
                    } else {
                        return Err(LocatorError::Malformed {
                            template: template.clone(),
                        });
                    }
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for LocatorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy, self.template)
    }
}

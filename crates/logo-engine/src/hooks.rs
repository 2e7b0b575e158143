//! Host extension hooks

use std::fmt;

/// Maps an English message template to a localized one.
pub type LocalizeFn = Box<dyn Fn(&str) -> Option<String>>;

/// Maps an uppercased word to `END` or `ELSE`.
pub type KeywordAliasFn = Box<dyn Fn(&str) -> Option<String>>;

/// Maps a colour name to one the turtle understands.
pub type ColorAliasFn = Box<dyn Fn(&str) -> Option<String>>;

/// Called with a procedure's name and source text after each definition.
pub type DefineHookFn = Box<dyn Fn(&str, &str)>;

/// Optional host callbacks.
#[derive(Default)]
pub struct Hooks {
    /// Message localization
    pub localize: Option<LocalizeFn>,

    /// Alternate spellings of `END` and `ELSE`
    pub keyword_alias: Option<KeywordAliasFn>,

    /// Colour names
    pub color_alias: Option<ColorAliasFn>,

    /// Save hook
    pub on_define: Option<DefineHookFn>,
}

impl Hooks {
    /// Localized template, falling back to the original.
    pub fn localize<'a>(&self, template: &'a str) -> std::borrow::Cow<'a, str> {
        match self.localize.as_ref().and_then(|f| f(template)) {
            Some(s) => std::borrow::Cow::Owned(s),
            None => std::borrow::Cow::Borrowed(template),
        }
    }

    /// Whether `word` spells `keyword` (`END`, `ELSE`), directly or through
    /// the alias hook.
    pub fn is_keyword(&self, word: &str, keyword: &str) -> bool {
        let upper = word.to_uppercase();
        let resolved = self
            .keyword_alias
            .as_ref()
            .and_then(|f| f(&upper))
            .unwrap_or(upper);
        resolved == keyword
    }

    /// Colour alias, if the hook knows one.
    pub fn color_alias(&self, name: &str) -> Option<String> {
        self.color_alias.as_ref().and_then(|f| f(name))
    }

    /// Report a new definition.
    pub fn defined(&self, name: &str, text: &str) {
        if let Some(f) = &self.on_define {
            f(name, text);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("localize", &self.localize.is_some())
            .field("keyword_alias", &self.keyword_alias.is_some())
            .field("color_alias", &self.color_alias.is_some())
            .field("on_define", &self.on_define.is_some())
            .finish()
    }
}

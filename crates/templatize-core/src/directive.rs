//! Directive table
//!
//! Fixed bidirectional mapping between directive kinds and the symbols that
//! spell them inside a tag. Ordinals are 1-based in declaration order; 0 is
//! reserved for a plain binding tag with no directive.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Every directive understood by the tag grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `!` - discarded tag
    Comment,
    /// `&` - render a sequence as a natural-language list
    List,
    /// `&#` - repeating section joined as a list
    ListSection,
    /// `#->` - section whose rendered text is passed to a function
    PassSection,
    /// `#` - inclusive section
    SectionInclude,
    /// `^` - exclusive section
    SectionExclude,
    /// `/` - section close
    SectionEnd,
    /// `>` - partial
    Partial,
    /// `.` - bound relative to the enclosing scope
    InContext,
    /// `->` - pass the value on to a function (infix)
    PassContext,
    /// `::` - format specifier (infix)
    Format,
    /// `;` - force HTML escaping (trailing)
    Escape,
    /// `!` placed right before an opening delimiter - literal delimiter
    TagEscape,
}

impl Directive {
    /// All directives in ordinal order
    pub const ALL: [Directive; 13] = [
        Directive::Comment,
        Directive::List,
        Directive::ListSection,
        Directive::PassSection,
        Directive::SectionInclude,
        Directive::SectionExclude,
        Directive::SectionEnd,
        Directive::Partial,
        Directive::InContext,
        Directive::PassContext,
        Directive::Format,
        Directive::Escape,
        Directive::TagEscape,
    ];

    /// Symbol spelling this directive
    pub fn symbol(self) -> &'static str {
        TABLE.to_symbol[self.ordinal() as usize]
    }

    /// 1-based ordinal
    pub fn ordinal(self) -> u8 {
        match self {
            Directive::Comment => 1,
            Directive::List => 2,
            Directive::ListSection => 3,
            Directive::PassSection => 4,
            Directive::SectionInclude => 5,
            Directive::SectionExclude => 6,
            Directive::SectionEnd => 7,
            Directive::Partial => 8,
            Directive::InContext => 9,
            Directive::PassContext => 10,
            Directive::Format => 11,
            Directive::Escape => 12,
            Directive::TagEscape => 13,
        }
    }

    /// Directive for an ordinal, `None` for 0 or out of range
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get((ordinal as usize).checked_sub(1)?).copied()
    }

    /// Directive for an exact symbol. Positional-only directives
    /// (`TagEscape`) are not part of this view.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        TABLE
            .to_ordinal
            .get(symbol)
            .and_then(|&ordinal| Self::from_ordinal(ordinal))
    }

    /// Match the leading directive of trimmed tag content.
    ///
    /// The two multi-character leading directives are tried first, then the
    /// first character alone. Symbols that are not leading directives
    /// (in-context, the infix ones, escape) yield `None`, meaning a plain tag.
    pub fn leading(content: &str) -> Option<Self> {
        for directive in [Directive::ListSection, Directive::PassSection] {
            if content.starts_with(directive.symbol()) {
                return Some(directive);
            }
        }
        let first = content.chars().next()?;
        let mut buf = [0u8; 4];
        match Self::from_symbol(first.encode_utf8(&mut buf))? {
            directive @ (Directive::Comment
            | Directive::List
            | Directive::SectionInclude
            | Directive::SectionExclude
            | Directive::SectionEnd
            | Directive::Partial) => Some(directive),
            _ => None,
        }
    }

    /// Whether this directive opens a section
    pub fn opens_section(self) -> bool {
        matches!(
            self,
            Directive::SectionInclude
                | Directive::SectionExclude
                | Directive::ListSection
                | Directive::PassSection
        )
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

struct DirectiveTable {
    to_symbol: Vec<&'static str>,
    to_ordinal: HashMap<&'static str, u8>,
}

static TABLE: Lazy<DirectiveTable> = Lazy::new(|| {
    const SYMBOLS: [(Directive, &str); 13] = [
        (Directive::Comment, "!"),
        (Directive::List, "&"),
        (Directive::ListSection, "&#"),
        (Directive::PassSection, "#->"),
        (Directive::SectionInclude, "#"),
        (Directive::SectionExclude, "^"),
        (Directive::SectionEnd, "/"),
        (Directive::Partial, ">"),
        (Directive::InContext, "."),
        (Directive::PassContext, "->"),
        (Directive::Format, "::"),
        (Directive::Escape, ";"),
        (Directive::TagEscape, "!"),
    ];

    // index 0 is the plain tag
    let mut to_symbol = vec![""];
    let mut to_ordinal = HashMap::new();
    for (directive, symbol) in SYMBOLS {
        to_symbol.push(symbol);
        if directive != Directive::TagEscape {
            to_ordinal.insert(symbol, directive.ordinal());
        }
    }
    DirectiveTable {
        to_symbol,
        to_ordinal,
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_round_trip_through_table() {
        for directive in Directive::ALL {
            assert_eq!(Directive::from_ordinal(directive.ordinal()), Some(directive));
        }
        assert_eq!(Directive::from_ordinal(0), None);
        assert_eq!(Directive::from_ordinal(14), None);
    }

    #[test]
    fn test_tag_escape_shares_symbol_but_not_lookup() {
        assert_eq!(Directive::TagEscape.symbol(), "!");
        assert_eq!(Directive::from_symbol("!"), Some(Directive::Comment));
    }

    #[test]
    fn test_leading_prefers_multi_character_symbols() {
        assert_eq!(Directive::leading("&#items"), Some(Directive::ListSection));
        assert_eq!(Directive::leading("#->wrap"), Some(Directive::PassSection));
        assert_eq!(Directive::leading("#items"), Some(Directive::SectionInclude));
        assert_eq!(Directive::leading("&items"), Some(Directive::List));
        assert_eq!(Directive::leading("^items"), Some(Directive::SectionExclude));
        assert_eq!(Directive::leading("/items"), Some(Directive::SectionEnd));
        assert_eq!(Directive::leading(">header"), Some(Directive::Partial));
    }

    #[test]
    fn test_leading_ignores_non_leading_symbols() {
        assert_eq!(Directive::leading(".name"), None);
        assert_eq!(Directive::leading(";name"), None);
        assert_eq!(Directive::leading("name"), None);
        assert_eq!(Directive::leading(""), None);
    }
}

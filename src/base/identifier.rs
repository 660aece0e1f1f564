use smol_str::SmolStr;

/// A name as written in source plus its canonical form.
///
/// `name` is what equality, hashing and lookups use; `display` is the
/// spelling shown to users. For TTCN-3 names the two coincide. ASN.1 style
/// names may carry hyphens, which are canonicalised to underscores so they
/// can be referenced from TTCN-3 code.
#[derive(Clone, Debug)]
pub struct Identifier {
    name: SmolStr,
    display: SmolStr,
}

impl Identifier {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        let display: SmolStr = text.into();
        let name = if display.contains('-') {
            SmolStr::new(display.replace('-', "_"))
        } else {
            display.clone()
        };
        Self { name, display }
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical name as a cheaply clonable string.
    pub fn key(&self) -> SmolStr {
        self.name.clone()
    }

    /// The spelling used in messages.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether the first character is an uppercase letter.
    ///
    /// ASN.1 distinguishes type-like from value-like references this way.
    pub fn starts_uppercase(&self) -> bool {
        self.display.chars().next().is_some_and(char::is_uppercase)
    }

    /// Check that a string is a well-formed identifier.
    pub fn is_valid(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) if unicode_ident::is_xid_start(first) => {}
            _ => return false,
        }
        let mut previous_hyphen = false;
        for c in chars {
            if c == '-' {
                if previous_hyphen {
                    return false;
                }
                previous_hyphen = true;
            } else if unicode_ident::is_xid_continue(c) {
                previous_hyphen = false;
            } else {
                return false;
            }
        }
        !previous_hyphen
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for Identifier {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

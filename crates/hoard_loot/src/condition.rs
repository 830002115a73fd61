//! # Conditions and Properties
//!
//! Loot nodes carry script predicates that must all hold before the node can
//! contribute. The scripting language itself lives outside this crate; the
//! generator only needs the evaluation contract:
//!
//! ```text
//! ConditionEvaluator::evaluate(condition, owner) -> bool
//!                                          │
//!                                          └── PropertyHolder: dotted lookup,
//!                                              falls back to the parent holder
//! ```
//!
//! [`PropertyConditions`] is a small default evaluator over properties, enough
//! for content that only compares owner state against literals.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

/// One authored script predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Condition(String);

impl Condition {
    /// Wraps predicate source text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// The predicate source text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property value visible to conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Any number.
    Number(f64),
    /// Text.
    Text(String),
    /// Ordered list; indexable by position in dotted paths.
    List(Vec<PropertyValue>),
    /// Nested properties; indexable by key in dotted paths.
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Truthiness used by bare-path conditions.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Builds a list of text values.
    pub fn text_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Text(s.into())).collect())
    }

    fn child(&self, segment: &str) -> Option<&PropertyValue> {
        match self {
            Self::Map(map) => map.get(segment),
            Self::List(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Something that exposes named properties to conditions.
pub trait PropertyHolder {
    /// A top-level property of this holder only.
    fn property(&self, key: &str) -> Option<&PropertyValue>;

    /// The holder to consult when a top-level key is not found here.
    fn parent(&self) -> Option<&dyn PropertyHolder> {
        None
    }

    /// Resolves a dotted path such as `world.difficulty` or `party.0`.
    ///
    /// The first segment is looked up here, then in the parent chain. The
    /// remaining segments descend into maps (by key) and lists (by index).
    fn lookup(&self, path: &str) -> Option<&PropertyValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        match self.property(first) {
            Some(mut value) => {
                for segment in segments {
                    value = value.child(segment)?;
                }
                Some(value)
            }
            None => self.parent()?.lookup(path),
        }
    }
}

/// A plain property map with an optional shared parent.
#[derive(Clone, Debug, Default)]
pub struct Properties {
    values: BTreeMap<String, PropertyValue>,
    parent: Option<Arc<Properties>>,
}

impl Properties {
    /// Creates an empty holder with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty holder that delegates to `parent`.
    #[must_use]
    pub fn with_parent(parent: Arc<Properties>) -> Self {
        Self {
            values: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    /// Sets a top-level property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes a top-level property.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    /// Top-level property of this holder only.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }
}

impl PropertyHolder for Properties {
    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    fn parent(&self) -> Option<&dyn PropertyHolder> {
        self.parent.as_deref().map(|p| p as &dyn PropertyHolder)
    }
}

/// Evaluates authored conditions against an owner.
pub trait ConditionEvaluator {
    /// Returns true if `condition` holds for `owner`.
    fn evaluate(&self, condition: &Condition, owner: &dyn PropertyHolder) -> bool;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&Condition, &dyn PropertyHolder) -> bool,
{
    fn evaluate(&self, condition: &Condition, owner: &dyn PropertyHolder) -> bool {
        self(condition, owner)
    }
}

/// Default evaluator over owner properties.
///
/// Accepted forms:
/// - `path`: the property exists and is truthy
/// - `!path`: the property is missing or falsy
/// - `path <op> literal` with `==`, `!=`, `>=`, `<=`, `>`, `<`
///
/// Literals are `true`, `false`, numbers, or text (optionally quoted).
/// Ordering operators only hold between numbers. Anything else is logged and
/// evaluates to false.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyConditions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

// Two-character operators first so `>=` is not read as `>`.
const OPERATORS: [(&str, CompareOp); 6] = [
    (">=", CompareOp::Ge),
    ("<=", CompareOp::Le),
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
];

impl PropertyConditions {
    /// Splits at the leftmost operator outside a quoted literal.
    fn split(text: &str) -> Option<(&str, CompareOp, &str)> {
        let mut quote = None;
        for (pos, c) in text.char_indices() {
            match quote {
                Some(open) if c == open => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None => {
                    let rest = &text[pos..];
                    if let Some(&(symbol, op)) =
                        OPERATORS.iter().find(|(symbol, _)| rest.starts_with(symbol))
                    {
                        return Some((text[..pos].trim(), op, rest[symbol.len()..].trim()));
                    }
                }
            }
        }
        None
    }

    fn literal(text: &str) -> PropertyValue {
        match text {
            "true" => PropertyValue::Bool(true),
            "false" => PropertyValue::Bool(false),
            _ => {
                if let Ok(n) = text.parse::<f64>() {
                    return PropertyValue::Number(n);
                }
                let unquoted = text
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .or_else(|| text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
                    .unwrap_or(text);
                PropertyValue::Text(unquoted.to_string())
            }
        }
    }

    fn is_path(text: &str) -> bool {
        !text.is_empty()
            && text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    }

    fn compare(left: Option<&PropertyValue>, op: CompareOp, right: &PropertyValue) -> bool {
        match op {
            CompareOp::Eq => left == Some(right),
            CompareOp::Ne => left != Some(right),
            _ => {
                let (Some(l), Some(r)) = (left.and_then(PropertyValue::as_number), right.as_number())
                else {
                    return false;
                };
                match op {
                    CompareOp::Ge => l >= r,
                    CompareOp::Le => l <= r,
                    CompareOp::Gt => l > r,
                    _ => l < r,
                }
            }
        }
    }
}

impl ConditionEvaluator for PropertyConditions {
    fn evaluate(&self, condition: &Condition, owner: &dyn PropertyHolder) -> bool {
        let text = condition.as_str().trim();

        if let Some((path, op, literal)) = Self::split(text) {
            if Self::is_path(path) && !literal.is_empty() {
                return Self::compare(owner.lookup(path), op, &Self::literal(literal));
            }
        } else if let Some(path) = text.strip_prefix('!') {
            let path = path.trim();
            if Self::is_path(path) {
                return !owner.lookup(path).is_some_and(PropertyValue::is_truthy);
            }
        } else if Self::is_path(text) {
            return owner.lookup(text).is_some_and(PropertyValue::is_truthy);
        }

        warn!(condition = %condition, "malformed condition, treated as false");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Arc<Properties> {
        let mut world = Properties::new();
        world.set("difficulty", 3u32);
        world.set("season", "winter");
        let mut boss = BTreeMap::new();
        boss.insert("defeated".to_string(), PropertyValue::Bool(true));
        world.set("boss", PropertyValue::Map(boss));
        Arc::new(world)
    }

    fn check(owner: &dyn PropertyHolder, text: &str) -> bool {
        PropertyConditions.evaluate(&Condition::new(text), owner)
    }

    #[test]
    fn test_lookup_delegates_to_parent() {
        let mut chest = Properties::with_parent(world());
        chest.set("locked", false);

        assert_eq!(chest.lookup("locked"), Some(&PropertyValue::Bool(false)));
        assert_eq!(chest.lookup("difficulty"), Some(&PropertyValue::Number(3.0)));
        assert_eq!(chest.lookup("boss.defeated"), Some(&PropertyValue::Bool(true)));
        assert_eq!(chest.lookup("boss.missing"), None);
        assert_eq!(chest.lookup("nothing"), None);
    }

    #[test]
    fn test_local_property_shadows_parent() {
        let mut chest = Properties::with_parent(world());
        chest.set("difficulty", 9u32);
        assert_eq!(chest.lookup("difficulty"), Some(&PropertyValue::Number(9.0)));
    }

    #[test]
    fn test_list_index_segment() {
        let mut holder = Properties::new();
        holder.set("items", PropertyValue::text_list(["gold", "sword"]));
        assert_eq!(holder.lookup("items.1"), Some(&PropertyValue::from("sword")));
        assert_eq!(holder.lookup("items.2"), None);
        assert_eq!(holder.lookup("items.x"), None);
    }

    #[test]
    fn test_bare_and_negated_paths() {
        let chest = Properties::with_parent(world());
        assert!(check(&chest, "boss.defeated"));
        assert!(!check(&chest, "!boss.defeated"));
        assert!(!check(&chest, "cursed"));
        assert!(check(&chest, "!cursed"));
    }

    #[test]
    fn test_comparisons() {
        let chest = Properties::with_parent(world());
        assert!(check(&chest, "difficulty >= 3"));
        assert!(check(&chest, "difficulty > 2.5"));
        assert!(!check(&chest, "difficulty < 3"));
        assert!(check(&chest, "difficulty <= 3"));
        assert!(check(&chest, "difficulty == 3"));
        assert!(check(&chest, "season == winter"));
        assert!(check(&chest, "season == 'winter'"));
        assert!(check(&chest, "season != \"summer\""));
        assert!(check(&chest, "boss.defeated == true"));
        // Ordering never holds between non-numbers.
        assert!(!check(&chest, "season > 1"));
        // A missing property equals nothing.
        assert!(!check(&chest, "cursed == true"));
        assert!(check(&chest, "cursed != true"));
    }

    #[test]
    fn test_operators_inside_quotes_are_literal_text() {
        let mut chest = Properties::new();
        chest.set("rune", "a>=b");
        chest.set("sigil", "x!=y");
        assert!(check(&chest, "rune == \"a>=b\""));
        assert!(check(&chest, "sigil == 'x!=y'"));
        assert!(!check(&chest, "rune != \"a>=b\""));
    }

    #[test]
    fn test_malformed_is_false() {
        let chest = Properties::new();
        assert!(!check(&chest, ""));
        assert!(!check(&chest, "a = 1"));
        assert!(!check(&chest, "== 3"));
        assert!(!check(&chest, "difficulty >="));
    }

    #[test]
    fn test_closure_evaluator() {
        let only_night = |c: &Condition, _: &dyn PropertyHolder| c.as_str() == "night";
        let owner = Properties::new();
        assert!(only_night.evaluate(&Condition::new("night"), &owner));
        assert!(!only_night.evaluate(&Condition::new("day"), &owner));
    }
}

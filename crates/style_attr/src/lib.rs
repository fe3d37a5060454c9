//! CSS style attributes: parsing and editing the declarations of `style="..."`.
//! See <https://www.w3.org/TR/css-style-attr/>
//!
//! Besides the attribute parser this crate provides [`InlineStyle`], the
//! declaration block backing an element's `style` attribute. It follows the
//! CSSOM `CSSStyleDeclaration` contract for `setProperty`, `removeProperty`,
//! `getPropertyValue` and `getPropertyPriority`: removing a property deletes
//! the declaration outright instead of leaving an empty value behind.

#![forbid(unsafe_code)]

use core::fmt;
use std::collections::HashMap;

/// Priority of a declaration (`!important` or not).
///
/// See <https://www.w3.org/TR/cssom-1/#dom-cssstyledeclaration-getpropertypriority>
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Priority {
    #[default]
    Normal,
    Important,
}

impl Priority {
    /// The CSSOM string form: `"important"` or the empty string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Important => "important",
        }
    }
}

/// A single CSS declaration parsed from a style attribute.
///
/// See <https://www.w3.org/TR/css-style-attr/#interpreting>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase as per CSS case-insensitivity.
    pub property: String,
    /// Raw value slice trimmed of surrounding ASCII whitespace, without any
    /// trailing `!important`. May contain spaces.
    pub value: String,
    /// Declaration priority.
    pub priority: Priority,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// - Splits on semicolons (`;`) into declaration items.
/// - For each item, splits on the first colon (`:`) into property and value.
/// - Trims ASCII whitespace and lowercases the property name.
/// - Strips a trailing `!important` (case-insensitive) into [`Priority::Important`].
/// - Skips empty or invalid items (no colon, empty property, or empty value after trimming).
///
/// See <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in input.split(';') {
        let item = raw_item.trim_matches(is_ascii_whitespace);
        if item.is_empty() {
            continue;
        }
        let Some((raw_prop, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property_text = raw_prop.trim_matches(is_ascii_whitespace);
        let (value_text, priority) = split_priority(raw_value.trim_matches(is_ascii_whitespace));
        if property_text.is_empty() || value_text.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: to_ascii_lowercase(property_text),
            value: value_text.to_owned(),
            priority,
        });
    }
    out
}

/// Split a trailing `!important` off a declaration value.
fn split_priority(value: &str) -> (&str, Priority) {
    let Some(bang) = value.rfind('!') else {
        return (value, Priority::Normal);
    };
    let marker = value[bang + 1..].trim_matches(is_ascii_whitespace);
    if marker.eq_ignore_ascii_case("important") {
        (
            value[..bang].trim_matches(is_ascii_whitespace),
            Priority::Important,
        )
    } else {
        (value, Priority::Normal)
    }
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
///
/// See <https://www.w3.org/TR/css-syntax-3/#whitespace>
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

/// Lowercase an ASCII identifier without allocating when already lowercase.
fn to_ascii_lowercase(text: &str) -> String {
    if !text.chars().any(|character| character.is_ascii_uppercase()) {
        return text.to_owned();
    }
    text.to_ascii_lowercase()
}

/// Normalize and filter a raw attribute string, keeping only the last occurrence
/// of each property.
///
/// See <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn normalize_style_attribute(input: &str) -> Vec<Declaration> {
    let mut last_index_for_property: HashMap<String, usize> = HashMap::new();
    let declarations = parse_style_attribute(input);
    for (index, decl_item) in declarations.iter().enumerate() {
        last_index_for_property.insert(decl_item.property.clone(), index);
    }
    declarations
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, decl_item)| match last_index_for_property.get(&decl_item.property) {
                Some(&last_index) if last_index == index => Some(decl_item),
                _ => None,
            },
        )
        .collect()
}

/// The declaration block behind an element's `style` attribute.
///
/// Declarations keep insertion order; updating an existing property keeps its
/// slot. An empty block serializes to the empty string.
///
/// See <https://www.w3.org/TR/cssom-1/#the-cssstyledeclaration-interface>
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Create an empty block.
    pub const fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Build a block from `style` attribute text.
    pub fn parse(input: &str) -> Self {
        Self {
            declarations: normalize_style_attribute(input),
        }
    }

    /// Number of declarations in the block.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate declarations in block order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Look up the declaration for a property, if one is present.
    pub fn declaration(&self, property: &str) -> Option<&Declaration> {
        let name = to_ascii_lowercase(property);
        self.declarations.iter().find(|decl| decl.property == name)
    }

    /// Whether the block holds a declaration for `property`.
    pub fn contains(&self, property: &str) -> bool {
        self.declaration(property).is_some()
    }

    /// CSSOM `getPropertyValue`: the value, or `""` when absent.
    pub fn get_property_value(&self, property: &str) -> &str {
        self.declaration(property)
            .map_or("", |decl| decl.value.as_str())
    }

    /// CSSOM `getPropertyPriority`: `"important"` or `""`.
    pub fn get_property_priority(&self, property: &str) -> &'static str {
        self.declaration(property)
            .map_or("", |decl| decl.priority.as_str())
    }

    /// CSSOM `setProperty`. An empty value removes the property, matching
    /// the CSSOM algorithm. Returns whether the block changed.
    ///
    /// See <https://www.w3.org/TR/cssom-1/#dom-cssstyledeclaration-setproperty>
    pub fn set_property(&mut self, property: &str, value: &str, priority: Priority) -> bool {
        let trimmed = value.trim_matches(is_ascii_whitespace);
        if trimmed.is_empty() {
            return self.remove_property(property).is_some();
        }
        let name = to_ascii_lowercase(property);
        if let Some(existing) = self
            .declarations
            .iter_mut()
            .find(|decl| decl.property == name)
        {
            if existing.value == trimmed && existing.priority == priority {
                return false;
            }
            trimmed.clone_into(&mut existing.value);
            existing.priority = priority;
            return true;
        }
        self.declarations.push(Declaration {
            property: name,
            value: trimmed.to_owned(),
            priority,
        });
        true
    }

    /// Put a declaration at `index` in block order, clamped to the end.
    /// Any existing declaration for the property is dropped first. Returns
    /// whether the block changed.
    pub fn insert_property(
        &mut self,
        index: usize,
        property: &str,
        value: &str,
        priority: Priority,
    ) -> bool {
        let trimmed = value.trim_matches(is_ascii_whitespace);
        if trimmed.is_empty() {
            return self.remove_property(property).is_some();
        }
        let name = to_ascii_lowercase(property);
        let previous = self
            .declarations
            .iter()
            .position(|decl| decl.property == name);
        if let Some(current) = previous {
            let unchanged = current == index
                && self
                    .declarations
                    .get(current)
                    .is_some_and(|decl| decl.value == trimmed && decl.priority == priority);
            if unchanged {
                return false;
            }
            self.declarations.remove(current);
        }
        let index = index.min(self.declarations.len());
        self.declarations.insert(
            index,
            Declaration {
                property: name,
                value: trimmed.to_owned(),
                priority,
            },
        );
        true
    }

    /// CSSOM `removeProperty`: deletes the declaration and returns its old
    /// value, or `None` when the property was not declared.
    ///
    /// See <https://www.w3.org/TR/cssom-1/#dom-cssstyledeclaration-removeproperty>
    pub fn remove_property(&mut self, property: &str) -> Option<String> {
        let name = to_ascii_lowercase(property);
        let index = self
            .declarations
            .iter()
            .position(|decl| decl.property == name)?;
        Some(self.declarations.remove(index).value)
    }

    /// Serialize back to `style` attribute text.
    pub fn to_css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, decl) in self.declarations.iter().enumerate() {
            if index > 0 {
                formatter.write_str(" ")?;
            }
            write!(formatter, "{}: {}", decl.property, decl.value)?;
            if decl.priority == Priority::Important {
                formatter.write_str(" !important")?;
            }
            formatter.write_str(";")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_important_and_lowercases_property() {
        let decls = parse_style_attribute("Width: 100% !IMPORTANT; color:red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "width");
        assert_eq!(decls[0].value, "100%");
        assert_eq!(decls[0].priority, Priority::Important);
        assert_eq!(decls[1].priority, Priority::Normal);
    }

    #[test]
    fn skips_items_without_value() {
        let decls = parse_style_attribute("width:; :red; height: !important; top: 0");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "top");
    }

    #[test]
    fn last_declaration_wins() {
        let normalized = normalize_style_attribute("width: 1px; height: 3px; width: 2px");
        let names: Vec<&str> = normalized.iter().map(|decl| decl.property.as_str()).collect();
        assert_eq!(names, ["height", "width"]);
    }

    #[test]
    fn set_then_remove_leaves_no_declaration() {
        let mut style = InlineStyle::new();
        assert!(style.set_property("max-width", "none", Priority::Important));
        assert_eq!(style.get_property_value("max-width"), "none");
        assert_eq!(style.get_property_priority("max-width"), "important");

        assert_eq!(style.remove_property("max-width").as_deref(), Some("none"));
        assert!(!style.contains("max-width"));
        assert!(style.is_empty());
        assert_eq!(style.to_css_text(), "");
        assert_eq!(style.remove_property("max-width"), None);
    }

    #[test]
    fn empty_value_removes_like_cssom() {
        let mut style = InlineStyle::parse("display: none");
        assert!(style.set_property("display", "", Priority::Normal));
        assert!(!style.contains("display"));
    }

    #[test]
    fn update_keeps_slot_and_serializes_in_order() {
        let mut style = InlineStyle::parse("width: 640px; height: 360px");
        assert!(style.set_property("width", "100%", Priority::Important));
        assert!(!style.set_property("width", "100%", Priority::Important));
        assert_eq!(
            style.to_css_text(),
            "width: 100% !important; height: 360px;"
        );
    }

    #[test]
    fn insert_puts_declaration_back_in_its_slot() {
        let mut style = InlineStyle::parse("color: red; top: 0");
        assert!(style.insert_property(0, "width", "640px", Priority::Normal));
        assert_eq!(style.to_css_text(), "width: 640px; color: red; top: 0;");
        assert!(!style.insert_property(0, "width", "640px", Priority::Normal));

        assert!(style.insert_property(9, "width", "1px", Priority::Important));
        assert_eq!(style.to_css_text(), "color: red; top: 0; width: 1px !important;");
    }
}

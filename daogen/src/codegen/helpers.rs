//! Naming helpers for code generation
//!
//! Conversions between database names and the identifiers used in generated
//! Rust sources.

use inflector::Inflector;

/// Rust keywords that need escaping when used as identifiers
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers
const RESERVED_PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Naming helpers used by the translator and the renderer
pub struct TemplateHelpers;

impl TemplateHelpers {
    /// Convert string to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_snake_case("UserProfile"), "user_profile");
    /// ```
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to `PascalCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_pascal_case("user_profile"), "UserProfile");
    /// ```
    #[must_use]
    pub fn to_pascal_case(input: &str) -> String {
        input.to_pascal_case()
    }

    /// Attribute name for a column
    ///
    /// Underscores separate words; the first letter of every word is
    /// upper-cased and the rest of the word is kept as written.
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_attr_name("user_name"), "UserName");
    /// assert_eq!(TemplateHelpers::to_attr_name("id"), "Id");
    /// assert_eq!(TemplateHelpers::to_attr_name("createdAt"), "CreatedAt");
    /// ```
    #[must_use]
    pub fn to_attr_name(column: &str) -> String {
        column
            .split('_')
            .filter(|word| !word.is_empty())
            .map(capitalize_words)
            .collect()
    }

    /// Identifier for a struct member or binding
    ///
    /// Snake case of the attribute name, escaped when it collides with a
    /// keyword or starts with a digit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_rust_ident("UserName"), "user_name");
    /// assert_eq!(TemplateHelpers::to_rust_ident("Type"), "r#type");
    /// assert_eq!(TemplateHelpers::to_rust_ident("Self"), "self_");
    /// ```
    #[must_use]
    pub fn to_rust_ident(attr: &str) -> String {
        let snake = attr.to_snake_case();
        if snake.is_empty() {
            return "field".to_string();
        }
        if snake.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return format!("f_{snake}");
        }
        if RESERVED_PATH_KEYWORDS.contains(&snake.as_str()) {
            return format!("{snake}_");
        }
        if RUST_KEYWORDS.contains(&snake.as_str()) {
            return format!("r#{snake}");
        }
        snake
    }

    /// Sanitize a path segment into a module name
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::codegen::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_module_segment("my-app"), "my_app");
    /// ```
    #[must_use]
    pub fn to_module_segment(segment: &str) -> String {
        segment.trim().replace(['-', ' ', '.'], "_")
    }

    /// Name of the generated DAO type
    #[must_use]
    pub fn to_dao_name(model: &str) -> String {
        format!("{model}Dao")
    }

    /// Name of the generated repository trait
    #[must_use]
    pub fn to_repository_name(model: &str) -> String {
        format!("{model}Repository")
    }
}

/// Upper-case the first letter of a word and of every letter following a
/// separator, leaving the other characters untouched
fn capitalize_words(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_boundary = true;
    for c in word.chars() {
        if at_boundary {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_boundary = !c.is_alphanumeric();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(TemplateHelpers::to_snake_case("UserProfile"), "user_profile");
        assert_eq!(TemplateHelpers::to_snake_case("user_profile"), "user_profile");
        assert_eq!(TemplateHelpers::to_snake_case("simple"), "simple");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(TemplateHelpers::to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(TemplateHelpers::to_pascal_case("order"), "Order");
    }

    #[test]
    fn test_attr_name() {
        assert_eq!(TemplateHelpers::to_attr_name("user_name"), "UserName");
        assert_eq!(TemplateHelpers::to_attr_name("id"), "Id");
        assert_eq!(TemplateHelpers::to_attr_name("URL_path"), "URLPath");
        assert_eq!(TemplateHelpers::to_attr_name("created__at"), "CreatedAt");
        assert_eq!(TemplateHelpers::to_attr_name("_hidden"), "Hidden");
        assert_eq!(TemplateHelpers::to_attr_name("a2b_c"), "A2bC");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(TemplateHelpers::to_rust_ident("UserName"), "user_name");
        assert_eq!(TemplateHelpers::to_rust_ident("Id"), "id");
        assert_eq!(TemplateHelpers::to_rust_ident("Type"), "r#type");
        assert_eq!(TemplateHelpers::to_rust_ident("Match"), "r#match");
        assert_eq!(TemplateHelpers::to_rust_ident("Crate"), "crate_");
        assert!(TemplateHelpers::to_rust_ident("2fa").starts_with("f_2"));
    }

    #[test]
    fn test_module_segment() {
        assert_eq!(TemplateHelpers::to_module_segment("my-app"), "my_app");
        assert_eq!(TemplateHelpers::to_module_segment("models"), "models");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(TemplateHelpers::to_dao_name("User"), "UserDao");
        assert_eq!(TemplateHelpers::to_repository_name("User"), "UserRepository");
    }
}

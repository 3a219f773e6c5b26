//! Minimal Rust syntax tree for generated sources
//!
//! Generated files are assembled from these nodes and printed by
//! [`SourceFile::to_source`]. The printer is pure: the same tree always
//! yields the same text, formatted close to `rustfmt` defaults.

use std::fmt::{self, Write};

const INDENT: &str = "    ";
const MAX_WIDTH: usize = 100;

/// A complete generated file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Leading `//` comment lines
    pub header: Vec<String>,
    /// `use` paths, printed in order without duplicates
    pub imports: Vec<String>,
    /// Top-level items
    pub items: Vec<Item>,
}

/// A top-level or impl-level item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `const NAME: Ty = value;`
    Const(ConstDecl),
    /// `struct`
    Struct(StructDecl),
    /// `impl` block
    Impl(ImplBlock),
    /// `trait`
    Trait(TraitDecl),
    /// Free function or method
    Function(FunctionDecl),
}

/// Constant declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Whether the constant is `pub`
    pub public: bool,
    /// Constant name
    pub name: String,
    /// Constant type
    pub ty: String,
    /// Initializer expression
    pub value: String,
}

/// Struct declaration; no fields prints a unit struct
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructDecl {
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Outer attributes, e.g. `#[derive(Debug)]`
    pub attributes: Vec<String>,
    /// Type name
    pub name: String,
    /// Named fields
    pub fields: Vec<StructField>,
}

/// Named struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Field attributes
    pub attributes: Vec<String>,
    /// Field identifier
    pub name: String,
    /// Field type
    pub ty: String,
}

/// `impl` block, inherent or for a trait
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplBlock {
    /// Outer attributes, e.g. `#[async_trait]`
    pub attributes: Vec<String>,
    /// Implemented trait, if any
    pub trait_name: Option<String>,
    /// Implementing type
    pub target: String,
    /// Associated items
    pub items: Vec<Item>,
}

/// Trait declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitDecl {
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Outer attributes
    pub attributes: Vec<String>,
    /// Trait name
    pub name: String,
    /// Supertrait bounds
    pub supertraits: Vec<String>,
    /// Required methods (functions without body)
    pub methods: Vec<FunctionDecl>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// `&self`
    SelfRef,
    /// `name: Ty`
    Named {
        /// Binding name
        name: String,
        /// Parameter type
        ty: String,
    },
}

impl Param {
    /// Named parameter
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfRef => f.write_str("&self"),
            Self::Named { name, ty } => write!(f, "{name}: {ty}"),
        }
    }
}

/// Function or method declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Doc comment lines
    pub docs: Vec<String>,
    /// Whether the function is `pub`
    pub public: bool,
    /// Whether the function is `async`
    pub is_async: bool,
    /// Function name
    pub name: String,
    /// Parameters
    pub params: Vec<Param>,
    /// Return type, `None` for `()`
    pub returns: Option<String>,
    /// Body statements; `None` prints a declaration ending in `;`
    pub body: Option<Vec<Stmt>>,
}

/// Statement inside a function body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// A single line, printed as written
    Line(String),
    /// Empty line
    Blank,
    /// `open { body } close`, e.g. an `if` or `for`
    Block {
        /// Opening line, ending in `{`
        open: String,
        /// Nested statements
        body: Vec<Self>,
        /// Closing line, usually `}`
        close: String,
    },
    /// Method chain with one call per line
    Chain {
        /// Receiver expression
        head: String,
        /// Calls, each starting with `.`
        calls: Vec<String>,
        /// Appended to the last call, e.g. `;` or `?;`
        end: String,
    },
}

impl Stmt {
    /// Single line statement
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    /// Braced block closed by `}`
    pub fn block(open: impl Into<String>, body: Vec<Self>) -> Self {
        Self::Block {
            open: open.into(),
            body,
            close: "}".to_string(),
        }
    }

    /// Method chain
    pub fn chain<I, S>(head: impl Into<String>, calls: I, end: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chain {
            head: head.into(),
            calls: calls.into_iter().map(Into::into).collect(),
            end: end.into(),
        }
    }
}

impl SourceFile {
    /// Print the file
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut printer = Printer::default();
        printer.file(self);
        printer.out
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn docs(&mut self, docs: &[String]) {
        for doc in docs {
            if doc.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {doc}"));
            }
        }
    }

    fn attributes(&mut self, attributes: &[String]) {
        for attribute in attributes {
            self.line(attribute);
        }
    }

    fn file(&mut self, file: &SourceFile) {
        let mut sections = 0;
        if !file.header.is_empty() {
            for comment in &file.header {
                self.line(&format!("// {comment}"));
            }
            sections += 1;
        }

        let mut seen: Vec<&str> = Vec::new();
        for import in &file.imports {
            if seen.contains(&import.as_str()) {
                continue;
            }
            if seen.is_empty() && sections > 0 {
                self.line("");
            }
            seen.push(import);
            self.line(&format!("use {import};"));
        }
        if !seen.is_empty() {
            sections += 1;
        }

        for item in &file.items {
            if sections > 0 {
                self.line("");
            }
            self.item(item);
            sections += 1;
        }
    }

    fn item(&mut self, item: &Item) {
        match item {
            Item::Const(decl) => self.constant(decl),
            Item::Struct(decl) => self.structure(decl),
            Item::Impl(block) => self.implementation(block),
            Item::Trait(decl) => self.trait_decl(decl),
            Item::Function(decl) => self.function(decl),
        }
    }

    fn constant(&mut self, decl: &ConstDecl) {
        self.docs(&decl.docs);
        let vis = if decl.public { "pub " } else { "" };
        self.line(&format!("{vis}const {}: {} = {};", decl.name, decl.ty, decl.value));
    }

    fn structure(&mut self, decl: &StructDecl) {
        self.docs(&decl.docs);
        self.attributes(&decl.attributes);
        if decl.fields.is_empty() {
            self.line(&format!("pub struct {};", decl.name));
            return;
        }
        self.line(&format!("pub struct {} {{", decl.name));
        self.depth += 1;
        for field in &decl.fields {
            self.docs(&field.docs);
            self.attributes(&field.attributes);
            self.line(&format!("pub {}: {},", field.name, field.ty));
        }
        self.depth -= 1;
        self.line("}");
    }

    fn implementation(&mut self, block: &ImplBlock) {
        self.attributes(&block.attributes);
        let head = block.trait_name.as_ref().map_or_else(
            || format!("impl {} {{", block.target),
            |name| format!("impl {name} for {} {{", block.target),
        );
        self.line(&head);
        self.depth += 1;
        for (i, item) in block.items.iter().enumerate() {
            if i > 0 {
                self.line("");
            }
            self.item(item);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn trait_decl(&mut self, decl: &TraitDecl) {
        self.docs(&decl.docs);
        self.attributes(&decl.attributes);
        if decl.supertraits.is_empty() {
            self.line(&format!("pub trait {} {{", decl.name));
        } else {
            self.line(&format!(
                "pub trait {}: {} {{",
                decl.name,
                decl.supertraits.join(" + ")
            ));
        }
        self.depth += 1;
        for (i, method) in decl.methods.iter().enumerate() {
            if i > 0 {
                self.line("");
            }
            self.function(method);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn function(&mut self, decl: &FunctionDecl) {
        self.docs(&decl.docs);

        let mut prefix = String::new();
        if decl.public {
            prefix.push_str("pub ");
        }
        if decl.is_async {
            prefix.push_str("async ");
        }
        let _ = write!(prefix, "fn {}(", decl.name);

        let mut suffix = String::from(")");
        if let Some(returns) = &decl.returns {
            let _ = write!(suffix, " -> {returns}");
        }
        suffix.push_str(if decl.body.is_some() { " {" } else { ";" });

        let params: Vec<String> = decl.params.iter().map(ToString::to_string).collect();
        let one_line = format!("{prefix}{}{suffix}", params.join(", "));
        if self.depth * INDENT.len() + one_line.len() <= MAX_WIDTH {
            self.line(&one_line);
        } else {
            self.line(&prefix);
            self.depth += 1;
            for param in &params {
                self.line(&format!("{param},"));
            }
            self.depth -= 1;
            self.line(&suffix);
        }

        if let Some(body) = &decl.body {
            self.depth += 1;
            self.statements(body);
            self.depth -= 1;
            self.line("}");
        }
    }

    fn statements(&mut self, body: &[Stmt]) {
        for stmt in body {
            match stmt {
                Stmt::Line(text) => self.line(text),
                Stmt::Blank => self.line(""),
                Stmt::Block { open, body, close } => {
                    self.line(open);
                    self.depth += 1;
                    self.statements(body);
                    self.depth -= 1;
                    self.line(close);
                }
                Stmt::Chain { head, calls, end } => {
                    self.line(head);
                    self.depth += 1;
                    let last = calls.len().saturating_sub(1);
                    for (i, call) in calls.iter().enumerate() {
                        if i == last {
                            self.line(&format!("{call}{end}"));
                        } else {
                            self.line(call);
                        }
                    }
                    self.depth -= 1;
                }
            }
        }
    }
}

//! Abstract Syntax Tree types for Visual Format Language lines

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis a line lays views out along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Relation between the constrained attribute and the predicate object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

/// Right-hand side of a predicate before metric resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal number, possibly negative
    Constant(f64),
    /// Metric name or view name, resolved during compilation
    Named(Identifier),
}

/// Priority of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Priority {
    Value(f64),
    Metric(Identifier),
}

/// A single predicate: `>=b*2+10@750`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub relation: Relation,
    pub object: Operand,
    /// Multiplier applied to the object (`*2`, `/2`)
    pub multiplier: Option<f64>,
    /// Constant added to the object (`+10`, `-10`)
    pub constant: Option<f64>,
    pub priority: Option<Priority>,
}

impl Predicate {
    /// `==object` with no multiplier, constant or priority
    pub fn equal(object: Operand) -> Self {
        Self {
            relation: Relation::Equal,
            object,
            multiplier: None,
            constant: None,
            priority: None,
        }
    }

    /// Whether this predicate uses arithmetic only available in extended mode
    pub fn is_extended(&self) -> bool {
        self.multiplier.is_some() || self.constant.is_some()
    }
}

/// Gap between two neighbouring items
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    /// `[a][b]`: no gap
    Flush,
    /// `[a]-[b]`: standard spacing
    Standard,
    /// `[a]-10-[b]` or `[a]-(>=10)-[b]`
    Predicates(Vec<Spanned<Predicate>>),
    /// `[a]~[b]`: gap shared by every `~` of the line (extended)
    Equal,
}

/// An item on a VFL line
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `|`: edge of the superview
    Superview,
    /// `[name(predicates)]`
    View {
        name: Spanned<Identifier>,
        predicates: Vec<Spanned<Predicate>>,
    },
}

impl Item {
    pub fn view_name(&self) -> Option<&str> {
        match self {
            Item::Superview => None,
            Item::View { name, .. } => Some(name.node.as_str()),
        }
    }
}

/// One parsed VFL line
#[derive(Debug, Clone, PartialEq)]
pub struct VflLine {
    pub orientation: Orientation,
    pub head: Spanned<Item>,
    /// Each connection links the previous item to the item that follows it
    pub tail: Vec<(Spanned<Connection>, Spanned<Item>)>,
}

impl VflLine {
    /// Items in line order
    pub fn items(&self) -> impl Iterator<Item = &Spanned<Item>> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, item)| item))
    }

    /// Names of the views on this line, in order of appearance
    pub fn view_names(&self) -> Vec<&str> {
        self.items().filter_map(|item| item.node.view_name()).collect()
    }
}

/// VFL source: a single string or an ordered list of strings.
///
/// Each string may hold several lines separated by `\n`.
#[derive(Debug, Clone, PartialEq)]
pub enum VflSource {
    Single(String),
    Multiple(Vec<String>),
}

impl VflSource {
    /// Non-empty, non-comment lines in source order
    pub fn lines(&self) -> Vec<&str> {
        let chunks: Vec<&str> = match self {
            VflSource::Single(s) => vec![s.as_str()],
            VflSource::Multiple(list) => list.iter().map(String::as_str).collect(),
        };
        chunks
            .into_iter()
            .flat_map(str::lines)
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .collect()
    }
}

impl From<&str> for VflSource {
    fn from(s: &str) -> Self {
        VflSource::Single(s.to_string())
    }
}

impl From<String> for VflSource {
    fn from(s: String) -> Self {
        VflSource::Single(s)
    }
}

impl From<Vec<String>> for VflSource {
    fn from(list: Vec<String>) -> Self {
        VflSource::Multiple(list)
    }
}

impl From<Vec<&str>> for VflSource {
    fn from(list: Vec<&str>) -> Self {
        VflSource::Multiple(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for VflSource {
    fn from(list: &[&str]) -> Self {
        VflSource::Multiple(list.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for VflSource {
    fn from(list: [&str; N]) -> Self {
        VflSource::Multiple(list.iter().map(|s| s.to_string()).collect())
    }
}

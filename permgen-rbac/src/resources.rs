//! # Resources
//!
//! Resource declarations and the naming rules that turn a free-form resource
//! identifier into a symbolic prefix (`USER_PROFILE`) and a permission
//! namespace slug (`user_profiles`).

use crate::actions::DeclaredAction;

/// A resource and the actions declared for it.
///
/// # Example
///
/// ```
/// use permgen_rbac::actions::StandardAction;
/// use permgen_rbac::resources::ResourceDeclaration;
///
/// let post = ResourceDeclaration::new("blogPost")
///     .with_action(StandardAction::ViewScoped)
///     .with_action("publish");
///
/// assert_eq!(post.symbol_prefix(), "BLOG_POST");
/// assert_eq!(post.slug(), "blog_posts");
/// assert_eq!(post.actions.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDeclaration {
    /// Resource identifier as written in configuration.
    pub name: String,
    /// Declared actions, in declaration order.
    pub actions: Vec<DeclaredAction>,
}

impl ResourceDeclaration {
    /// Create a declaration with no actions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Create a declaration from a list of actions.
    pub fn with_actions<I, A>(name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<DeclaredAction>,
    {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Append an action.
    pub fn with_action(mut self, action: impl Into<DeclaredAction>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Uppercase snake_case prefix used for symbolic names.
    pub fn symbol_prefix(&self) -> String {
        upper_snake(&self.name)
    }

    /// Pluralized snake_case namespace used in permission strings.
    pub fn slug(&self) -> String {
        plural_slug(&self.name)
    }
}

/// Convert an identifier to snake_case.
///
/// Word boundaries are whitespace, `-`, `_`, a lowercase letter or digit
/// followed by an uppercase letter, and the end of an uppercase run that is
/// followed by a capitalized word (`APIKey` -> `api_key`). Other characters
/// are kept as they are.
///
/// # Example
///
/// ```
/// use permgen_rbac::resources::snake_case;
///
/// assert_eq!(snake_case("userProfile"), "user_profile");
/// assert_eq!(snake_case("APIKey"), "api_key");
/// assert_eq!(snake_case("audit log"), "audit_log");
/// assert_eq!(snake_case("view_any"), "view_any");
/// ```
pub fn snake_case(value: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = value.trim().chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

/// Convert an identifier to UPPER_SNAKE_CASE.
pub fn upper_snake(value: &str) -> String {
    snake_case(value).to_uppercase()
}

/// Convert an identifier to a pluralized snake_case slug.
///
/// Only the last word is pluralized.
///
/// # Example
///
/// ```
/// use permgen_rbac::resources::plural_slug;
///
/// assert_eq!(plural_slug("user"), "users");
/// assert_eq!(plural_slug("meetingTask"), "meeting_tasks");
/// assert_eq!(plural_slug("category"), "categories");
/// assert_eq!(plural_slug("users"), "users");
/// ```
pub fn plural_slug(value: &str) -> String {
    let snake = snake_case(value);
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize(last)),
        None => pluralize(&snake),
    }
}

const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "knowledge",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "software",
    "species",
    "staff",
    "traffic",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("calf", "calves"),
    ("child", "children"),
    ("criterion", "criteria"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("index", "indices"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("quiz", "quizzes"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
    ("tooth", "teeth"),
    ("vertex", "vertices"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

const O_ES: &[&str] = &["echo", "hero", "potato", "tomato", "veto"];

/// Pluralize a single English word.
///
/// Words that already end in a plain `s` are treated as plural and left
/// untouched, so `users` stays `users`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return (*plural).to_string();
    }

    if ["ss", "sh", "ch", "x", "z"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", word);
    }
    if lower.ends_with("us") {
        return format!("{}es", word);
    }
    if let Some(stem) = strip_suffix_ignore_case(word, "is") {
        return format!("{}es", stem);
    }
    if lower.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = strip_suffix_ignore_case(word, "y") {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if before.map_or(false, |c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if O_ES.contains(&lower.as_str()) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// `word` without an ASCII `suffix`, compared case-insensitively.
fn strip_suffix_ignore_case<'a>(word: &'a str, suffix: &str) -> Option<&'a str> {
    let split = word.len().checked_sub(suffix.len())?;
    if !word.is_char_boundary(split) || !word[split..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&word[..split])
}

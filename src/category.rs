//! Method categories.
//!
//! Every remote method lives in one category; the category name is the
//! prefix of the fully-qualified method name (`user` + `Infos` = `userInfos`).

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// A namespace of remote methods.
///
/// # Examples
///
/// ```
/// use mailjet::Category;
///
/// let category: Category = "Lists".parse().unwrap();
/// assert_eq!(category, Category::Lists);
/// assert_eq!(category.qualify("addcontact"), "listsAddcontact");
///
/// assert!("newsletter".parse::<Category>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Api,
    User,
    Message,
    Contact,
    Lists,
    Report,
    Help,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 7] = [
        Category::Api,
        Category::User,
        Category::Message,
        Category::Contact,
        Category::Lists,
        Category::Report,
        Category::Help,
    ];

    /// Returns the lower-case name used as the method prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Api => "api",
            Category::User => "user",
            Category::Message => "message",
            Category::Contact => "contact",
            Category::Lists => "lists",
            Category::Report => "report",
            Category::Help => "help",
        }
    }

    /// Builds the fully-qualified method name: the category followed by the
    /// method with its first character upper-cased. The rest of the method
    /// name is kept as given.
    pub fn qualify(&self, method: &str) -> String {
        let mut chars = method.chars();
        let mut name = String::with_capacity(self.as_str().len() + method.len());
        name.push_str(self.as_str());
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        name
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or(Error::InvalidCategory(lowered))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// src/model.rs
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One route to register in a route table.
///
/// Serialized field order is the order the synthesizer sees, so `path` comes
/// before `routes` here; the synthesizer hoists array fields to the front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    /// Route prefix, e.g. `/aps/Foo`
    pub path: String,

    /// Child routes rendered under the prefix
    pub routes: Vec<RouteChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteChild {
    pub path: String,
    pub component: String,
}

impl RouteEntry {
    /// The entry registered for a new page: a single `list` child pointing at
    /// `@/pages/<name>/list/listPage`.
    pub fn for_page(prefix: &str, name: &str) -> Self {
        let path = format!("{prefix}/{name}");
        RouteEntry {
            routes: vec![RouteChild {
                path: format!("{path}/list"),
                component: format!("@/pages/{name}/list/listPage"),
            }],
            path,
        }
    }
}

/// The two source shapes recognized as a route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    /// `someCall({ <key>: [ ... ] })`
    CallArgument,
    /// `const <key> = [ ... ]`
    Declaration,
}

/// Which H0 front-end architecture the project uses; decides where the route
/// table lives and what it looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliVersion {
    #[default]
    #[value(name = "hzeroJs")]
    HzeroJs,
    #[value(name = "hzeroCli")]
    HzeroCli,
}

impl CliVersion {
    /// Route file relative to the project root.
    pub fn route_file(self) -> &'static str {
        match self {
            CliVersion::HzeroJs => "config/config.ts",
            CliVersion::HzeroCli => "src/config/routers.ts",
        }
    }

    pub fn route_shape(self) -> RouteShape {
        match self {
            CliVersion::HzeroJs => RouteShape::CallArgument,
            CliVersion::HzeroCli => RouteShape::Declaration,
        }
    }

    /// Property or variable name holding the route array.
    pub fn route_key(self) -> &'static str {
        match self {
            CliVersion::HzeroJs => "routes",
            CliVersion::HzeroCli => "config",
        }
    }
}

/// Templates the injection tool knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    ListPage,
    FilterList,
    HeadLineList,
}

impl TemplateName {
    pub const ALL: [TemplateName; 3] = [
        TemplateName::ListPage,
        TemplateName::FilterList,
        TemplateName::HeadLineList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::ListPage => "listPage",
            TemplateName::FilterList => "filterList",
            TemplateName::HeadLineList => "headLineList",
        }
    }

    /// Comma separated list for help and error output.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text files inside the template that carry placeholders.
    pub fn placeholder_files(self) -> &'static [&'static str] {
        match self {
            TemplateName::ListPage => &["list/listPage.tsx", "stores/listPageDs.ts"],
            TemplateName::FilterList => &["list/listPage.tsx"],
            TemplateName::HeadLineList => &[
                "list/listPage.tsx",
                "list/searchForm.tsx",
                "stores/lineListDs.ts",
            ],
        }
    }

    /// Page directory name for `app_name`. List pages are component-like and
    /// get a capitalized directory.
    pub fn page_name(self, app_name: &str) -> String {
        match self {
            TemplateName::ListPage => upper_first(app_name),
            _ => app_name.to_string(),
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported template `{s}`"))
    }
}

/// A template directory plus the substitutions applied when it is copied.
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    pub name: String,
    pub source_dir: PathBuf,
    /// Applied in insertion order, so longer keys that contain shorter ones
    /// must come first.
    pub placeholders: IndexMap<String, String>,
    /// Files (relative to `source_dir`) the placeholders are applied to.
    pub text_files: Vec<PathBuf>,
}

/// A fully regenerated file waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectFile {
    pub path: PathBuf,
    pub code: String,
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_entry_layout() {
        let entry = RouteEntry::for_page("/aps", "Foo");
        assert_eq!(entry.path, "/aps/Foo");
        assert_eq!(entry.routes[0].path, "/aps/Foo/list");
        assert_eq!(entry.routes[0].component, "@/pages/Foo/list/listPage");
    }

    #[test]
    fn template_names_round_trip_through_str() {
        for t in TemplateName::ALL {
            assert_eq!(t.as_str().parse::<TemplateName>(), Ok(t));
        }
        assert!("detailPage".parse::<TemplateName>().is_err());
        assert_eq!(TemplateName::supported_list(), "listPage, filterList, headLineList");
    }

    #[test]
    fn list_page_directory_is_capitalized() {
        assert_eq!(TemplateName::ListPage.page_name("order"), "Order");
        assert_eq!(TemplateName::HeadLineList.page_name("order"), "order");
        assert_eq!(lower_first("Order"), "order");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn cli_version_picks_route_file() {
        assert_eq!(CliVersion::default(), CliVersion::HzeroJs);
        assert_eq!(CliVersion::HzeroJs.route_shape(), RouteShape::CallArgument);
        assert_eq!(CliVersion::HzeroCli.route_key(), "config");
        assert_eq!(CliVersion::HzeroCli.route_file(), "src/config/routers.ts");
    }
}

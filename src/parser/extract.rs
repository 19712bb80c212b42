//! Lexical endpoint extraction.
//!
//! Four independent pattern families are run over the whole text, one per
//! call-site idiom. Every syntactic match is a hit: there is no semantic
//! check that a `.get('/x')` really registers a route, and a line matched
//! by two families produces two records.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::collate::locale_cmp;
use super::method::HttpMethod;

/// Shared tail of every family: quoted path, then an optional block
/// comment before the closing parenthesis.
const ROUTE_TAIL: &str = r#"\s*\(\s*['"`]([^'"`]+)['"`](?:[^)]*/\*\s*([^*]*)\s*\*/)?"#;

static DOT_CALL: Lazy<Regex> = Lazy::new(|| family_regex(r"\.(get|post|put|delete|patch)"));
static ROUTER_CALL: Lazy<Regex> =
    Lazy::new(|| family_regex(r"router\.(get|post|put|delete|patch)"));
static DECORATOR_CAPITALIZED: Lazy<Regex> =
    Lazy::new(|| family_regex(r"@(Get|Post|Put|Delete|Patch)"));
static DECORATOR_LOWERCASE: Lazy<Regex> =
    Lazy::new(|| family_regex(r"@(get|post|put|delete|patch)"));

fn family_regex(prefix: &str) -> Regex {
    Regex::new(&format!("{prefix}{ROUTE_TAIL}")).expect("endpoint pattern is valid")
}

/// One lexical recognition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// `app.get('/users')`, `server.post(...)`: any `.verb(` call.
    DotCall,
    /// `router.get('/users')`.
    RouterCall,
    /// `@Get('/users')`.
    DecoratorCapitalized,
    /// `@get('/users')`.
    DecoratorLowercase,
}

impl PatternFamily {
    /// Families in the order they are applied.
    pub const ALL: [PatternFamily; 4] = [
        PatternFamily::DotCall,
        PatternFamily::RouterCall,
        PatternFamily::DecoratorCapitalized,
        PatternFamily::DecoratorLowercase,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            PatternFamily::DotCall => &DOT_CALL,
            PatternFamily::RouterCall => &ROUTER_CALL,
            PatternFamily::DecoratorCapitalized => &DECORATOR_CAPITALIZED,
            PatternFamily::DecoratorLowercase => &DECORATOR_LOWERCASE,
        }
    }
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternFamily::DotCall => write!(f, "dot_call"),
            PatternFamily::RouterCall => write!(f, "router_call"),
            PatternFamily::DecoratorCapitalized => write!(f, "decorator_capitalized"),
            PatternFamily::DecoratorLowercase => write!(f, "decorator_lowercase"),
        }
    }
}

/// One discovered endpoint declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub method: HttpMethod,
    /// Route literal exactly as written.
    pub path: String,
    /// Zero-based line where the match starts.
    pub line_number: usize,
    /// Trimmed body of a trailing `/* ... */` comment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Which rule produced this record.
    pub family: PatternFamily,
}

impl EndpointRecord {
    /// `"<METHOD> <path>"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Extract every endpoint declaration from `text`, sorted by method rank
/// and then by path.
pub fn extract(text: &str) -> Vec<EndpointRecord> {
    let mut records = Vec::new();
    for family in PatternFamily::ALL {
        extract_family(text, family, &mut records);
    }
    sort_endpoints(&mut records);
    records
}

fn extract_family(text: &str, family: PatternFamily, out: &mut Vec<EndpointRecord>) {
    // Matches come back in increasing position, so count newlines incrementally.
    let mut scanned = 0;
    let mut line = 0;

    for caps in family.regex().captures_iter(text) {
        let (Some(whole), Some(method), Some(path)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        line += text[scanned..whole.start()].matches('\n').count();
        scanned = whole.start();

        let description = caps
            .get(3)
            .map(|m| m.as_str().trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        out.push(EndpointRecord {
            method: HttpMethod::from(method.as_str()),
            path: path.as_str().to_string(),
            line_number: line,
            description,
            family,
        });
    }
}

/// Stable sort: method rank, then path in locale order.
pub fn sort_endpoints(records: &mut [EndpointRecord]) {
    records.sort_by(compare_endpoints);
}

fn compare_endpoints(a: &EndpointRecord, b: &EndpointRecord) -> Ordering {
    a.method
        .rank()
        .cmp(&b.method.rank())
        .then_with(|| locale_cmp(&a.path, &b.path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(records: &[EndpointRecord]) -> Vec<String> {
        records.iter().map(EndpointRecord::label).collect()
    }

    #[test]
    fn test_plain_call_without_description() {
        let records = extract("app.get('/users', listUsers);");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, HttpMethod::Get);
        assert_eq!(records[0].path, "/users");
        assert_eq!(records[0].line_number, 0);
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].family, PatternFamily::DotCall);
    }

    #[test]
    fn test_trailing_block_comment_description() {
        let records = extract("app.get('/users', handler /* list users */);");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description.as_deref(), Some("list users"));
    }

    #[test]
    fn test_empty_comment_is_no_description() {
        let records = extract("app.post(\"/items\", h /*   */);");
        assert_eq!(records[0].description, None);
    }

    #[test]
    fn test_comment_after_closing_paren_is_ignored() {
        let records = extract("app.get('/users', h); /* not ours */");
        assert_eq!(records[0].description, None);
    }

    #[test]
    fn test_quote_styles() {
        let src = "app.get('/a');\napp.get(\"/b\");\napp.get(`/c/${id}`);";
        let records = extract(src);
        assert_eq!(labels(&records), vec!["GET /a", "GET /b", "GET /c/${id}"]);
    }

    #[test]
    fn test_path_kept_verbatim() {
        let records = extract("app.delete('/users/:id/', h);");
        assert_eq!(records[0].path, "/users/:id/");
        assert_eq!(records[0].method, HttpMethod::Delete);
    }

    #[test]
    fn test_line_numbers_are_zero_based() {
        let src = "const app = express();\n\napp.get('/a', h);\n// filler\napp.post('/b', h);\n";
        let records = extract(src);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_number, 2);
        assert_eq!(records[1].line_number, 4);
    }

    #[test]
    fn test_router_line_matches_two_families() {
        let src = "app.get('/a', h);\nrouter.get('/a', h);";
        let records = extract(src);

        assert!(records.iter().all(|r| r.label() == "GET /a"));
        let lines: Vec<usize> = records.iter().map(|r| r.line_number).collect();
        assert!(lines.contains(&0));
        assert!(lines.contains(&1));
        // `router.get` is also a `.get` call, so it is reported by both rules.
        let router_hits: Vec<_> = records.iter().filter(|r| r.line_number == 1).collect();
        assert_eq!(router_hits.len(), 2);
        assert!(router_hits.iter().any(|r| r.family == PatternFamily::DotCall));
        assert!(router_hits.iter().any(|r| r.family == PatternFamily::RouterCall));
    }

    #[test]
    fn test_capitalized_decorator() {
        let src = "@Controller('items')\nclass Items {\n  @Delete('/items/:id')\n  remove() {}\n  @Post('/items')\n  create() {}\n  @Get('/items')\n  list() {}\n}";
        let records = extract(src);
        assert_eq!(
            labels(&records),
            vec!["GET /items", "POST /items", "DELETE /items/:id"]
        );
        assert!(records
            .iter()
            .all(|r| r.family == PatternFamily::DecoratorCapitalized));
        assert_eq!(records[1].line_number, 4);
    }

    #[test]
    fn test_lowercase_decorator() {
        let records = extract("@put(\"/things/{id}\")\ndef update(id): ...");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, HttpMethod::Put);
        assert_eq!(records[0].family, PatternFamily::DecoratorLowercase);
    }

    #[test]
    fn test_fastapi_attribute_decorator_is_a_dot_call() {
        let records = extract("@app.patch('/users/{id}')\nasync def patch_user(): ...");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, HttpMethod::Patch);
        assert_eq!(records[0].family, PatternFamily::DotCall);
    }

    #[test]
    fn test_method_rank_then_path() {
        let src = "\
app.delete('/z', h);
app.get('/b', h);
app.patch('/a', h);
app.put('/a', h);
app.post('/c', h);
app.get('/a', h);
";
        assert_eq!(
            labels(&extract(src)),
            vec!["GET /a", "GET /b", "POST /c", "PUT /a", "PATCH /a", "DELETE /z"]
        );
    }

    #[test]
    fn test_path_params_sort_before_letters() {
        let src = "@get('/items/search')\n@get('/items/{item_id}')\n@get('/items/_meta')";
        assert_eq!(
            labels(&extract(src)),
            vec!["GET /items/_meta", "GET /items/{item_id}", "GET /items/search"]
        );
    }

    #[test]
    fn test_ties_are_stable() {
        let src = "app.get('/same', a);\napp.get('/same', b);";
        let records = extract(src);
        assert_eq!(records[0].line_number, 0);
        assert_eq!(records[1].line_number, 1);
    }

    #[test]
    fn test_unknown_methods_sort_last() {
        let mut records = extract("app.get('/b', h);");
        records.push(EndpointRecord {
            method: HttpMethod::from("options"),
            path: "/a".to_string(),
            line_number: 9,
            description: None,
            family: PatternFamily::DotCall,
        });
        records.extend(extract("app.delete('/c', h);"));
        sort_endpoints(&mut records);
        assert_eq!(labels(&records), vec!["GET /b", "DELETE /c", "OPTIONS /a"]);
    }

    #[test]
    fn test_deterministic() {
        let src = "router.post('/x' /* make x */);\n@Get('/y')\napp.put('/x');";
        assert_eq!(extract(src), extract(src));
    }

    #[test]
    fn test_no_matches() {
        assert!(extract("").is_empty());
        assert!(extract("const x = map.get(key);").is_empty());
        assert!(extract("app.get(").is_empty());
        assert!(extract("app.head('/x')").is_empty());
    }

    #[test]
    fn test_uppercase_call_not_matched() {
        assert!(extract("app.GET('/x')").is_empty());
    }

    #[test]
    fn test_unicode_before_match() {
        let records = extract("// ünïcödé ✓\napp.get('/ok', h);");
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[0].path, "/ok");
    }
}

//! Review request construction.
//!
//! Each category has a fixed instruction template; the snippet is appended
//! verbatim after a `Code:` line.

use crate::models::{ReviewCategory, ReviewRequest};

const GENERAL_TEMPLATE: &str = "Review this code and provide a single, comprehensive analysis covering:
- Code quality and best practices
- Potential bugs and issues
- Key improvements needed

Code:
";

const SECURITY_TEMPLATE: &str = "Review this code for security issues and provide a single, comprehensive analysis covering:
- Security vulnerabilities
- Input validation issues
- Key security improvements needed

Code:
";

const PERFORMANCE_TEMPLATE: &str = "Review this code for performance issues and provide a single, comprehensive analysis covering:
- Time and space complexity
- Performance bottlenecks
- Key optimization opportunities

Code:
";

fn template(category: ReviewCategory) -> &'static str {
    match category {
        ReviewCategory::General => GENERAL_TEMPLATE,
        ReviewCategory::Security => SECURITY_TEMPLATE,
        ReviewCategory::Performance => PERFORMANCE_TEMPLATE,
    }
}

/// Build the request for `category`, embedding `snippet` verbatim.
///
/// Category names typed by the user are checked when parsed into
/// [`ReviewCategory`], which rejects anything unknown.
pub fn build(snippet: &str, category: ReviewCategory) -> ReviewRequest {
    let mut prompt = String::with_capacity(template(category).len() + snippet.len());
    prompt.push_str(template(category));
    prompt.push_str(snippet);

    ReviewRequest::new(snippet.to_string(), category, prompt)
}

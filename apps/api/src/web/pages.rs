//! HTML page builders. Every interpolated value goes through `escape_html`.

use serde_json::Value;

use crate::matching::MatchResult;
use crate::models::candidate::CandidateRow;
use crate::profile::{ordered_sections, scalar_text, title_case, Profile};
use crate::web::presentation::ScoreClass;

pub const MISSING_SECTION: &str = "Not available";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 a { color: inherit; text-decoration: none; }
textarea { width: 100%; min-height: 14rem; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .5rem; border-bottom: 1px solid #ddd; vertical-align: top; }
.score { font-weight: bold; white-space: nowrap; }
.success { color: #1b7f3b; }
.neutral { color: #555; }
.warning { color: #b35c00; }
.placeholder { color: #999; font-style: italic; }
section { margin-bottom: 1.5rem; }
dt { font-weight: bold; margin-top: .4rem; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1><a href=\"/\">cvmatch</a></h1>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// GET /: job description form.
pub fn index_page() -> String {
    layout(
        "Find candidates",
        r#"<form method="post" action="/results" enctype="multipart/form-data">
<p><label for="job_text">Job description</label></p>
<p><textarea id="job_text" name="job_text" placeholder="Paste the job description here"></textarea></p>
<p><label for="job_file">or upload it (.txt, .pdf)</label>
<input type="file" id="job_file" name="job_file" accept=".txt,.pdf"></p>
<p><button type="submit">Find candidates</button></p>
</form>"#,
    )
}

/// Ranked matches. `results` must already be sorted.
pub fn results_page(job_description: &str, results: &[MatchResult]) -> String {
    let mut body = format!(
        "<h2>Job description</h2>\n<p>{}</p>\n<h2>Candidates</h2>\n",
        escape_html(job_description).replace('\n', "<br>")
    );

    if results.is_empty() {
        body.push_str("<p class=\"placeholder\">No matching candidates found.</p>\n");
        return layout("Results", &body);
    }

    body.push_str("<table>\n<tr><th>Score</th><th>Candidate</th><th>Reason</th></tr>\n");
    for result in results {
        // Class follows the two-decimal value shown, not the raw score.
        let shown = (result.score * 100.0).round() / 100.0;
        let class = ScoreClass::from_score(shown).css_class();
        body.push_str(&format!(
            "<tr><td class=\"score {class}\">{shown:.2}</td>\
             <td><a href=\"/candidates/{id}\">Profile</a> · \
             <a href=\"/cv/{id}\" target=\"_blank\">CV</a> · \
             <a href=\"/cv/{id}?download=true\">Download</a></td>\
             <td>{}</td></tr>\n",
            escape_html(&result.reason),
            id = result.id,
        ));
    }
    body.push_str("</table>\n");
    layout("Results", &body)
}

/// Structured profile in fixed section order; absent sections show a placeholder.
pub fn candidate_page(candidate: &CandidateRow) -> String {
    let empty = Profile::new();
    let profile = candidate.profile.as_object().unwrap_or(&empty);

    let mut body = format!(
        "<p><a href=\"/cv/{id}\" target=\"_blank\">View CV</a> · \
         <a href=\"/cv/{id}?download=true\">Download {}</a></p>\n",
        escape_html(&candidate.file_name),
        id = candidate.id,
    );

    for section in ordered_sections(profile) {
        body.push_str(&format!("<section>\n<h2>{}</h2>\n", escape_html(&section.title)));
        match section.content {
            Some(value) => write_html(&mut body, value),
            None => body.push_str(&format!("<p class=\"placeholder\">{MISSING_SECTION}</p>\n")),
        }
        body.push_str("</section>\n");
    }

    let title = profile
        .get("personal_info")
        .and_then(|p| p.get("full_name"))
        .and_then(Value::as_str)
        .unwrap_or(candidate.file_name.as_str());
    layout(title, &body)
}

fn write_html(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            out.push_str("<dl>\n");
            for (key, v) in map.iter().filter(|(k, _)| !k.starts_with('_')) {
                out.push_str(&format!("<dt>{}</dt>\n<dd>", escape_html(&title_case(key))));
                write_html(out, v);
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n");
        }
        Value::Array(items) => {
            out.push_str("<ul>\n");
            for item in items {
                out.push_str("<li>");
                write_html(out, item);
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        scalar => out.push_str(&escape_html(&scalar_text(scalar))),
    }
}

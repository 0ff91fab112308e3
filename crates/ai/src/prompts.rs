//! Classification prompts and reply parsing.

use rmq_core::{method_list, ResearchMethod, MIXED_METHOD};

const TITLE_PREFIX: &str = "Title: ";
const METHOD_PREFIX: &str = "Resulting Method: ";

/// Ask for the title of an article excerpt.
pub fn title_prompt(excerpt: &str) -> String {
    format!("Extract the title from this research paper:\n\n{excerpt}\n\nReturn only: Title: <title>")
}

/// Ask for the research method of an article excerpt.
pub fn method_prompt(excerpt: &str) -> String {
    format!(
        "Classify the research method of this research paper, based on exactly these research methods {}. :\n\n{excerpt}\n\nReturn only: Resulting Method: <method>",
        method_list()
    )
}

/// Ask for title and method in a single turn.
pub fn classification_prompt(article_text: &str) -> String {
    format!(
        "Please classify the following text into one of the following research methods:\n\
         {}.\n\n\
         Please provide your result as follows:\n\
         Title: The article's title\n\
         Resulting Method: The resulting method. If you do not find a result, please return \"{MIXED_METHOD}\".\n\n\
         Do not return anything else.\n\n\
         Article Text:\n\
         {article_text}\n",
        method_list()
    )
}

/// Title from a `Title: <title>` reply.
pub fn parse_title(reply: &str) -> String {
    reply.replace(TITLE_PREFIX, "").trim().to_string()
}

/// Method from a `Resulting Method: <method>` reply.
///
/// Labels matching the catalogue (ignoring case) are normalised to the
/// catalogue spelling so they resolve to criteria files; anything else is
/// kept as given.
pub fn parse_method(reply: &str) -> String {
    normalise_method(&reply.replace(METHOD_PREFIX, ""))
}

fn normalise_method(raw: &str) -> String {
    let raw = raw.trim();
    match ResearchMethod::from_label(raw) {
        Some(method) => method.label().to_string(),
        None => raw.to_string(),
    }
}

/// Title and method read from a single-turn classification reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Article title, if the reply named one
    pub title: Option<String>,
    /// Research method; `mixed method` when the reply named none
    pub method: String,
}

/// Parse a reply to [`classification_prompt`].
pub fn parse_classification(reply: &str) -> Classification {
    let mut title = None;
    let mut method = None;
    for line in reply.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(TITLE_PREFIX.trim_end()) {
            title = Some(rest.trim().to_string()).filter(|t| !t.is_empty());
        } else if let Some(rest) = line.strip_prefix(METHOD_PREFIX.trim_end()) {
            method = Some(normalise_method(rest)).filter(|m| !m.is_empty());
        }
    }
    Classification {
        title,
        method: method.unwrap_or_else(|| MIXED_METHOD.to_string()),
    }
}

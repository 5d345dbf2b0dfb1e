//! Search links to offers similar to a posting, built from its title.

use serde::Serialize;
use url::form_urlencoded;

/// Used when the posting has no usable title.
pub const DEFAULT_SEARCH_TITLE: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferLink {
    pub board: &'static str,
    pub url: String,
}

/// Form-encoded `title` (spaces become `+`), falling back to `DEFAULT_SEARCH_TITLE`.
pub fn search_query(title: &str) -> String {
    let title = match title.trim() {
        "" => DEFAULT_SEARCH_TITLE,
        trimmed => trimmed,
    };
    form_urlencoded::byte_serialize(title.as_bytes()).collect()
}

/// One search link per job board: Welcome to the Jungle, LinkedIn, Indeed,
/// Glassdoor and Jooble.
pub fn similar_offer_links(title: &str) -> Vec<OfferLink> {
    let query = search_query(title);
    vec![
        OfferLink {
            board: "Welcome to the Jungle",
            url: format!("https://www.welcometothejungle.com/fr/jobs?query={query}"),
        },
        OfferLink {
            board: "LinkedIn",
            url: format!("https://www.linkedin.com/jobs/search/?keywords={query}"),
        },
        OfferLink {
            board: "Indeed",
            url: format!("https://fr.indeed.com/jobs?q={query}"),
        },
        OfferLink {
            board: "Glassdoor",
            // Glassdoor wants the keyword span length in the path.
            url: format!(
                "https://www.glassdoor.fr/Emploi/{query}-emplois-SRCH_KO0,{}.htm",
                query.len()
            ),
        },
        OfferLink {
            board: "Jooble",
            url: format!("https://fr.jooble.org/SearchResult?ukw={query}"),
        },
    ]
}

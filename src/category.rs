use std::ops::RangeInclusive;

use rand::{seq::SliceRandom as _, Rng};

/// Category tags and the search keywords each one stands for.
const CATEGORIES: [(&str, &[&str]); 9] = [
    (
        "tech",
        &[
            "software",
            "developer",
            "engineer",
            "programmer",
            "coding",
            "tech",
            "IT",
            "data",
            "python",
            "javascript",
            "react",
            "node",
            "fullstack",
            "frontend",
            "backend",
            "devops",
            "cloud",
            "AWS",
            "Azure",
            "machine learning",
            "AI",
            "artificial intelligence",
        ],
    ),
    (
        "finance",
        &[
            "finance",
            "accounting",
            "bookkeeper",
            "financial",
            "analyst",
            "banking",
            "investment",
            "accountant",
            "CFO",
            "controller",
            "budget",
            "tax",
            "audit",
        ],
    ),
    (
        "marketing",
        &[
            "marketing",
            "SEO",
            "content",
            "social media",
            "digital marketing",
            "brand",
            "advertising",
            "PR",
            "public relations",
            "growth",
            "market research",
        ],
    ),
    (
        "design",
        &[
            "design",
            "UX",
            "UI",
            "user experience",
            "graphic",
            "creative",
            "product design",
            "visual",
            "art director",
            "web design",
        ],
    ),
    (
        "healthcare",
        &[
            "healthcare",
            "medical",
            "doctor",
            "nurse",
            "physician",
            "pharma",
            "clinical",
            "health",
            "therapy",
            "caregiver",
            "dental",
            "veterinary",
        ],
    ),
    (
        "education",
        &[
            "education",
            "teacher",
            "professor",
            "instructor",
            "tutor",
            "academic",
            "curriculum",
            "teaching",
            "school",
            "university",
            "college",
            "training",
        ],
    ),
    (
        "remote",
        &[
            "remote",
            "work from home",
            "WFH",
            "telecommute",
            "virtual",
            "distributed",
        ],
    ),
    (
        "entry_level",
        &[
            "entry level",
            "entry-level",
            "junior",
            "graduate",
            "internship",
            "trainee",
            "associate",
        ],
    ),
    (
        "senior",
        &[
            "senior",
            "lead",
            "principal",
            "staff",
            "manager",
            "director",
            "head",
            "chief",
            "vp",
            "executive",
        ],
    ),
];

pub fn list_categories() -> Vec<&'static str> {
    CATEGORIES.iter().map(|&(tag, _)| tag).collect()
}

/// Returns the keywords a category tag expands to, or `None` for an unknown tag.
pub fn category_terms(tag: &str) -> Option<&'static [&'static str]> {
    CATEGORIES
        .iter()
        .find(|&&(x, _)| x == tag)
        .map(|&(_, terms)| terms)
}

/// Expands each known category into a random handful of its keywords.
///
/// Unknown tags are skipped. Two calls with the same input generally return different terms.
pub fn expand_categories<R: Rng>(
    categories: &[String],
    per_category: RangeInclusive<usize>,
    rng: &mut R,
) -> Vec<String> {
    let mut terms = vec![];
    for category in categories {
        let Some(category_terms) = category_terms(category.trim()) else {
            log::warn!("Ignoring unknown category: {}", category);
            continue;
        };
        let amount = rng.gen_range(per_category.clone()).min(category_terms.len());
        terms.extend(
            category_terms
                .choose_multiple(rng, amount)
                .map(|x| x.to_string()),
        );
    }
    terms
}

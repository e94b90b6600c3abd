use colored::Colorize as _;
use job_scout::{category_terms, list_categories};

fn main() {
    for tag in list_categories() {
        let terms = category_terms(tag).unwrap_or_default();
        println!("{:12} {}", tag.bold(), terms.join(", "));
    }
}

use crate::normalized;

/// The minimum salary assumed for ranges that don't state one ("Competitive", "").
pub const DEFAULT_MIN_SALARY: u64 = 100_000;

/// Base (min, max) salary in thousands by seniority word, checked in order.
const LEVEL_RANGES: [(&[&str], (u32, u32)); 9] = [
    (&["intern", "interns", "internship"], (40, 70)),
    (&["junior"], (60, 90)),
    (&["associate"], (75, 110)),
    (&["senior"], (120, 180)),
    (&["lead"], (140, 200)),
    (&["manager"], (130, 190)),
    (&["director"], (160, 250)),
    (&["vp"], (180, 300)),
    (&["chief"], (200, 350)),
];
const DEFAULT_RANGE: (u32, u32) = (80, 120);

/// Salary multiplier in percent by field word, checked in order.
const FIELD_MODIFIERS: [(&[&str], u32); 8] = [
    (&["software"], 120),
    (&["data"], 115),
    (&["engineer", "engineers", "engineering"], 110),
    (&["developer", "developers", "development"], 110),
    (&["designer", "designers"], 90),
    (&["marketing"], 85),
    (&["content"], 80),
    (&["assistant"], 70),
];

/// Estimates a plausible salary range for a job title, like "$132,000 - $198,000".
pub fn estimate_salary_range(title: &str) -> String {
    let norm = normalized(title);
    let words = norm.split(' ').collect::<Vec<_>>();
    let has_any = |forms: &[&str]| words.iter().any(|word| forms.iter().any(|x| x == word));

    let (min, max) = LEVEL_RANGES
        .iter()
        .find(|&&(forms, _)| has_any(forms))
        .map_or(DEFAULT_RANGE, |&(_, range)| range);
    let modifier = FIELD_MODIFIERS
        .iter()
        .find(|&&(forms, _)| has_any(forms))
        .map_or(100, |&(_, modifier)| modifier);

    format!(
        "${},000 - ${},000",
        min * modifier / 100,
        max * modifier / 100,
    )
}

/// A cruder title-based range for cards that show no salary at all.
pub fn coarse_salary_range(title: &str) -> &'static str {
    re!(SENIOR_RE, r"\b(senior|lead)\b");
    re!(JUNIOR_RE, r"\b(junior|entry)\b");

    let norm = normalized(title);
    if SENIOR_RE.is_match(&norm) {
        "$120,000 - $180,000"
    } else if JUNIOR_RE.is_match(&norm) {
        "$60,000 - $90,000"
    } else {
        "$80,000 - $120,000"
    }
}

/// Extracts the lower bound of a free-text salary range.
///
/// Placeholders and figureless text yield [`DEFAULT_MIN_SALARY`], and figures under 1000 are
/// taken to be in thousands.
pub fn extract_min_salary(salary_range: &str) -> u64 {
    re!(RANGE_SEPARATOR_RE, r"\s*[-–]\s*");

    let salary_range = salary_range.trim();
    if salary_range.is_empty()
        || salary_range.eq_ignore_ascii_case("competitive")
        || salary_range.eq_ignore_ascii_case("negotiable")
    {
        return DEFAULT_MIN_SALARY;
    }

    let min_part = RANGE_SEPARATOR_RE
        .split(salary_range)
        .next()
        .unwrap_or(salary_range);
    let digits = min_part
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    let Ok(min_salary) = digits.parse::<u64>() else {
        return DEFAULT_MIN_SALARY;
    };

    if min_salary < 1000 {
        min_salary * 1000
    } else {
        min_salary
    }
}

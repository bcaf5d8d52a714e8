//! Normalization of free-form equipment and muscle group descriptions into
//! atomic tags.
//!
//! Catalog sources describe requirements loosely ("Dumbbells (optional)",
//! "Glutes & hamstrings focus", "Pull-up bar / mat"). Each description is split
//! into tokens, trailing descriptor words are dropped, known aliases are mapped
//! to canonical tags and unknown tokens are title-cased. The result is
//! deduplicated while preserving the input order.

const DESCRIPTOR_WORDS: [&str; 8] = [
    "focus",
    "emphasis",
    "target",
    "targeting",
    "optional",
    "mainly",
    "primary",
    "secondary",
];

const SEPARATOR_WORDS: [&str; 2] = ["and", "with"];

static EQUIPMENT_ALIASES: &[(&str, &[&str])] = &[
    ("barbell", &["Barbell"]),
    ("plates", &["Barbell"]),
    ("dumbbell", &["Dumbbell"]),
    ("dumbbells", &["Dumbbell"]),
    ("bodyweight", &["Bodyweight"]),
    ("body weight", &["Bodyweight"]),
    ("machine", &["Machine"]),
    ("cable machine", &["Machine"]),
    ("cable", &["Machine"]),
    ("resistance bands", &["Bands"]),
    ("bands", &["Bands"]),
    ("band", &["Bands"]),
    ("kettlebell", &["Kettlebell"]),
    ("medicine ball", &["Medicine Ball"]),
    ("jump rope", &["Jump Rope"]),
    ("pull up bar", &["Bodyweight", "Pull-up Bar"]),
    ("mat", &["Bodyweight", "Mat"]),
];

static MUSCLE_ALIASES: &[(&str, &[&str])] = &[
    ("chest", &["Chest"]),
    ("back", &["Back"]),
    ("legs", &["Legs"]),
    ("shoulders", &["Shoulders"]),
    ("core", &["Core"]),
    ("biceps", &["Biceps"]),
    ("triceps", &["Triceps"]),
    ("posterior chain", &["Back", "Legs", "Posterior Chain"]),
    ("glutes", &["Glutes", "Legs", "Posterior Chain"]),
    ("calves", &["Calves", "Legs"]),
    ("full body", &["Full Body"]),
];

#[must_use]
pub fn normalize_equipment(value: &str) -> Vec<String> {
    normalize(value, EQUIPMENT_ALIASES)
}

#[must_use]
pub fn normalize_muscles(value: &str) -> Vec<String> {
    normalize(value, MUSCLE_ALIASES)
}

#[must_use]
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .filter(|t| !t.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize(value: &str, aliases: &[(&str, &[&str])]) -> Vec<String> {
    let mut tags: Vec<String> = vec![];

    for token in split(value) {
        let key = normalize_key(&token);
        if key.is_empty() {
            continue;
        }
        let mapped = aliases
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, tags)| *tags);
        match mapped {
            Some(mapped) => tags.extend(mapped.iter().map(ToString::to_string)),
            None => tags.push(title_case(&token)),
        }
    }

    let mut deduplicated: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !deduplicated.contains(&tag) {
            deduplicated.push(tag);
        }
    }
    deduplicated
}

fn split(value: &str) -> Vec<String> {
    let mut text = String::with_capacity(value.len());
    let mut depth = 0_u32;
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => text.push(c),
            _ => {}
        }
    }
    let text = text.replace('&', " and ").replace('/', ",");

    let mut tokens = vec![];
    for part in text.split([',', ';', '+', '|']) {
        let mut words: Vec<&str> = vec![];
        for word in part.split_whitespace() {
            if SEPARATOR_WORDS.iter().any(|w| word.eq_ignore_ascii_case(w)) {
                push_token(&mut tokens, &mut words);
            } else {
                words.push(word);
            }
        }
        push_token(&mut tokens, &mut words);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, words: &mut Vec<&str>) {
    while words
        .last()
        .is_some_and(|w| DESCRIPTOR_WORDS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }
    if !words.is_empty() {
        tokens.push(words.join(" "));
    }
    words.clear();
}

fn normalize_key(value: &str) -> String {
    value
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.trim().chars() {
        if previous_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    result
}

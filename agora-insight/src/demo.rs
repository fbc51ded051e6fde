//! Seeded synthetic UBI opinions for demonstrating the pipeline without
//! collected data.

use chrono::DateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::opinion::{Opinion, ProvenanceSource};

/// Default number of demo opinions.
pub const DEFAULT_DEMO_COUNT: usize = 80;

const PRO: &[&str] = &[
    "UBI would give people the freedom to pursue education and start businesses without fear of \
     destitution. The Finnish pilot showed reduced stress and improved wellbeing with minimal labor \
     market impact.",
    "Automation is eliminating jobs faster than we can create them. A basic income is the only \
     realistic safety net for the 21st century economy.",
    "I support UBI because it removes the bureaucratic overhead of means-tested welfare. Just give \
     people cash and let them decide how to use it.",
    "As a small business owner, I think UBI would be great for entrepreneurship. People could take \
     risks knowing they won't starve if they fail.",
    "The Stockton pilot proved it works. People used the money for essentials, found better jobs, \
     and their mental health improved dramatically.",
    "We should support universal basic income now. Poverty is a policy choice and this is the most \
     effective solution we have evidence for.",
    "I'm in favor of UBI. It would help caregivers, artists, volunteers, people who do essential \
     work that the market doesn't compensate.",
];

const AGAINST: &[&str] = &[
    "UBI is fiscally irresponsible. The cost would be enormous and the money would be better spent \
     on targeted programs for those who actually need help.",
    "I oppose UBI because it would cause significant inflation. If everyone gets more money, prices \
     just go up and we're back where we started.",
    "Giving people free money discourages work. We need programs that help people develop skills \
     and find employment, not handouts.",
    "UBI is a terrible idea. The pilots were too small and short to prove anything. Scaling to a \
     whole country would be completely different.",
    "The fiscal cost of UBI would be dangerous. We'd either need massive tax increases or \
     unsustainable debt. Neither is acceptable.",
    "I'm against UBI. It doesn't address the root causes of poverty like lack of education, \
     healthcare, and affordable housing.",
];

const NEUTRAL: &[&str] = &[
    "I can see arguments on both sides. UBI might reduce poverty but the cost concerns are \
     legitimate. Maybe a negative income tax would be better?",
    "Interesting concept but I'm not sure it would work at scale. The pilots showed mixed results \
     depending on how you measure success.",
    "I think the debate about UBI is more nuanced than either side admits. It depends entirely on \
     the implementation details and funding mechanism.",
    "Not sure where I stand on UBI. The evidence from pilots is promising but limited. We need \
     larger, longer experiments before deciding.",
];

const SUFFIXES: &[&str] = &[
    "This is an important issue.",
    "We need more research on this.",
    "The data is clear on this point.",
    "I've changed my mind on this over time.",
    "My experience confirms this view.",
];

const SOURCES: &[ProvenanceSource] = &[
    ProvenanceSource::Reddit,
    ProvenanceSource::Twitter,
    ProvenanceSource::Survey,
];

/// Collection window start (2025-01-01T00:00:00Z) and length.
const COLLECTION_START: i64 = 1_735_689_600;
const COLLECTION_SECONDS: i64 = 30 * 86_400;

const AGE_RANGES: &[&str] = &["18-24", "25-34", "35-44", "45-54", "55-64", "65+"];
const REGIONS: &[&str] = &["US-Northeast", "US-South", "US-Midwest", "US-West", "EU-West", "EU-North"];
const EMPLOYMENT: &[&str] = &["employed", "unemployed", "self-employed", "student", "retired"];
const INCOME: &[&str] = &["low", "lower-middle", "middle", "upper-middle", "high"];

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    // Every table above is non-empty.
    &items[rng.gen_range(0..items.len())]
}

/// Generate `count` synthetic opinions; identical for identical seeds.
pub fn generate_demo_opinions(count: usize, seed: u64) -> Vec<Opinion> {
    let mut rng = StdRng::seed_from_u64(seed);
    let texts: Vec<&str> = PRO.iter().chain(AGAINST).chain(NEUTRAL).copied().collect();

    (0..count)
        .map(|_| {
            let mut text = pick(&mut rng, &texts).to_string();
            if rng.gen_bool(0.5) {
                text.push(' ');
                text.push_str(*pick(&mut rng, SUFFIXES));
            }
            let mut opinion = Opinion::new(text)
                .with_source(*pick(&mut rng, SOURCES))
                .with_demographic("age_range", *pick(&mut rng, AGE_RANGES))
                .with_demographic("region", *pick(&mut rng, REGIONS))
                .with_demographic("employment_status", *pick(&mut rng, EMPLOYMENT))
                .with_demographic("income_bracket", *pick(&mut rng, INCOME));
            opinion.submitted_at =
                DateTime::from_timestamp(COLLECTION_START + rng.gen_range(0..COLLECTION_SECONDS), 0);
            opinion
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_seeded() {
        assert_eq!(generate_demo_opinions(40, 42), generate_demo_opinions(40, 42));
        assert_ne!(generate_demo_opinions(40, 42), generate_demo_opinions(40, 43));
    }

    #[test]
    fn test_demo_opinions_are_complete() {
        let opinions = generate_demo_opinions(DEFAULT_DEMO_COUNT, 42);
        assert_eq!(opinions.len(), DEFAULT_DEMO_COUNT);
        for op in &opinions {
            assert!(!op.text.is_empty());
            assert_eq!(op.demographics.len(), 4);
            let at = op.submitted_at.unwrap().timestamp();
            assert!((COLLECTION_START..COLLECTION_START + COLLECTION_SECONDS).contains(&at));
        }
    }

    #[test]
    fn test_some_demo_texts_carry_a_suffix() {
        let opinions = generate_demo_opinions(DEFAULT_DEMO_COUNT, 42);
        let suffixed = opinions
            .iter()
            .filter(|op| SUFFIXES.iter().any(|s| op.text.ends_with(s)))
            .count();
        assert!(suffixed > 0 && suffixed < opinions.len());
    }
}

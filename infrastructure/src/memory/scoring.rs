//! Stand-in text generation and scoring.
//!
//! Neither is a language model. Generation stitches prompt words and a
//! fixed vocabulary together under a seeded generator so that the same
//! prompt and parameters always yield the same text; scoring computes
//! surface statistics of that text.

use paramlab_domain::{GenerationParameters, MetricsResult, ResponseId, metric_names};
use std::collections::{BTreeMap, HashSet};

const VOCABULARY: &[&str] = &[
    "the", "answer", "considers", "this", "idea", "with", "care", "and", "a", "clear",
    "structure", "while", "several", "examples", "show", "how", "each", "part", "connects",
    "to", "broader", "themes", "that", "suggest", "further", "questions", "about", "detail",
    "nuance", "tradeoffs", "between", "options",
];

/// Sentence length bounds, in words
const SENTENCE_WORDS: (u64, u64) = (6, 14);

/// Sentence length the scorer treats as ideal
const IDEAL_SENTENCE_WORDS: f64 = 12.0;

/// Response length the scorer treats as complete
const FULL_LENGTH_WORDS: f64 = 60.0;

/// xorshift64* generator; small and stable across platforms.
struct StandInRng(u64);

impl StandInRng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound.max(1)
    }

    fn range(&mut self, (lo, hi): (u64, u64)) -> u64 {
        lo + self.below(hi - lo + 1)
    }

    fn unit(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// FNV-1a, used to derive seeds from text
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Lowercased alphanumeric words of `text`
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Produce the `index`-th stand-in response for `prompt`.
///
/// With temperature zero every index yields the same text. An explicit
/// seed replaces the prompt-derived one.
pub fn generate_text(prompt: &str, params: &GenerationParameters, index: u32) -> String {
    let mut seed = params.seed.unwrap_or_else(|| fnv1a(prompt));
    if params.temperature > 0.0 {
        seed = seed.wrapping_add(u64::from(index).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }
    let mut rng = StandInRng::new(seed);

    let prompt_words = words(prompt);
    // top_p narrows the pool of filler words
    let pool = ((VOCABULARY.len() as f64 * params.top_p).ceil() as usize).clamp(1, VOCABULARY.len());
    // low temperature stays close to the prompt
    let prompt_bias = (0.9 - params.temperature / 2.0).clamp(0.1, 0.9);

    let target = rng.range((30, 70)).min(u64::from(params.max_tokens)).max(1);
    let mut sentences = Vec::new();
    let mut sentence: Vec<String> = Vec::new();
    let mut sentence_len = rng.range(SENTENCE_WORDS);

    for _ in 0..target {
        let word = if !prompt_words.is_empty() && rng.unit() < prompt_bias {
            prompt_words[rng.below(prompt_words.len() as u64) as usize].clone()
        } else {
            VOCABULARY[rng.below(pool as u64) as usize].to_string()
        };
        sentence.push(word);

        if sentence.len() as u64 >= sentence_len {
            sentences.push(finish_sentence(&sentence));
            sentence.clear();
            sentence_len = rng.range(SENTENCE_WORDS);
        }
    }
    if !sentence.is_empty() {
        sentences.push(finish_sentence(&sentence));
    }

    sentences.join(" ")
}

fn finish_sentence(words: &[String]) -> String {
    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Score `text` as a response to `prompt`.
pub fn score_text(response_id: &ResponseId, prompt: &str, text: &str) -> MetricsResult {
    let words = words(text);
    let count = words.len();

    let lexical_diversity = if count == 0 {
        0.0
    } else {
        words.iter().collect::<HashSet<_>>().len() as f64 / count as f64
    };

    let repetition = if count < 2 {
        0.0
    } else {
        let bigrams: Vec<_> = words.windows(2).collect();
        let unique = bigrams.iter().collect::<HashSet<_>>().len();
        1.0 - unique as f64 / bigrams.len() as f64
    };

    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let avg_sentence_length = count as f64 / sentence_count as f64;

    let prompt_set: HashSet<_> = self::words(prompt).into_iter().collect();
    let prompt_overlap = if prompt_set.is_empty() {
        0.0
    } else {
        let seen: HashSet<_> = words.iter().collect();
        prompt_set.iter().filter(|w| seen.contains(w)).count() as f64 / prompt_set.len() as f64
    };

    let length_score = (count as f64 / FULL_LENGTH_WORDS).min(1.0);
    let sentence_score =
        1.0 - ((avg_sentence_length - IDEAL_SENTENCE_WORDS).abs() / IDEAL_SENTENCE_WORDS).min(1.0);
    let overall = 0.3 * lexical_diversity
        + 0.2 * (1.0 - repetition)
        + 0.2 * length_score
        + 0.15 * sentence_score
        + 0.15 * prompt_overlap;

    MetricsResult {
        response_id: response_id.clone(),
        metrics: BTreeMap::from([
            (metric_names::LENGTH.to_string(), count as f64),
            (metric_names::LEXICAL_DIVERSITY.to_string(), lexical_diversity),
            (metric_names::REPETITION.to_string(), repetition),
            (metric_names::AVG_SENTENCE_LENGTH.to_string(), avg_sentence_length),
            (metric_names::PROMPT_OVERLAP.to_string(), prompt_overlap),
        ]),
        overall_score: round4(overall.clamp(0.0, 1.0)),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

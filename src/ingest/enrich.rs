//! Enrichment hooks run over extracted text

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A topic term and its relative frequency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub palabra: String,
    pub relevancia: f64,
}

/// Fields added to a text-derived record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    pub resumen: String,
    /// Entity label to the entities found under it
    pub entidades: BTreeMap<String, Vec<String>>,
    pub temas: Vec<Topic>,
}

pub trait Enricher {
    fn enrich(&self, text: &str) -> Enrichment;
}

/// Leaves every enrichment field empty
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEnrichment;

impl Enricher for NoEnrichment {
    fn enrich(&self, _text: &str) -> Enrichment {
        Enrichment::default()
    }
}

const STOP_WORDS: &[&str] = &[
    "para", "por", "con", "como", "esta", "este", "estos", "estas", "sobre", "entre", "desde",
    "hasta", "donde", "cuando", "sino", "pero", "porque", "segun", "según", "cual", "cuales",
    "dicho", "dicha", "dichos", "dichas", "sean", "será", "sera", "fueron", "cada", "otro",
    "otra", "otros", "otras", "todo", "toda", "todos", "todas", "mismo", "misma", "tiene",
    "tienen", "debe", "deben", "podrá", "hace", "parte", "artículo", "articulo", "presente",
    "mediante", "dentro", "demás", "también", "tambien", "solo", "sólo", "ante", "bajo",
    "contra", "durante", "tras", "menos", "además", "ademas", "aquellos", "aquellas", "haya",
    "sido", "siendo", "estar", "están", "estan", "había", "habia", "ellos", "ellas", "that",
    "this", "with", "from", "have", "which",
];

/// Ranks the most frequent content words of a text
///
/// Words are lowercase alphabetic runs of at least `min_word_len` characters
/// that are not stop words. Relevance is a word's share of all counted words.
/// The summary is the opening of the text, cut at a word boundary.
#[derive(Debug, Clone)]
pub struct TermFrequencyEnricher {
    top_n: usize,
    min_word_len: usize,
    summary_chars: usize,
}

impl Default for TermFrequencyEnricher {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_word_len: 4,
            summary_chars: 300,
        }
    }
}

impl TermFrequencyEnricher {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            ..Self::default()
        }
    }

    fn topics(&self, text: &str) -> Vec<Topic> {
        let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;

        for word in text.split(|c: char| !c.is_alphabetic()) {
            if word.chars().count() < self.min_word_len {
                continue;
            }
            let word = word.to_lowercase();
            if stop.contains(word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
            total += 1;
        }

        if total == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<_> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(self.top_n)
            .map(|(palabra, count)| Topic {
                palabra,
                relevancia: ((count as f64 / total as f64) * 10_000.0).round() / 10_000.0,
            })
            .collect()
    }

    fn summary(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= self.summary_chars {
            return collapsed;
        }

        let cut: String = collapsed.chars().take(self.summary_chars + 1).collect();
        match cut.rfind(' ') {
            Some(pos) => format!("{}...", &cut[..pos]),
            None => format!("{}...", cut),
        }
    }
}

impl Enricher for TermFrequencyEnricher {
    fn enrich(&self, text: &str) -> Enrichment {
        Enrichment {
            resumen: self.summary(text),
            entidades: BTreeMap::new(),
            temas: self.topics(text),
        }
    }
}

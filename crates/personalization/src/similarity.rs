//! "You might also like" lookups. The recommender only sees the
//! [`SimilarityLookup`] trait; [`TfIdfSimilarity`] is the default
//! implementation, ranking items by TF-IDF cosine similarity of their names.

use meal_core::Catalog;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

pub trait SimilarityLookup: Send + Sync {
    /// Up to `top_n` items most similar to `item`, best first, never `item` itself.
    fn similar_items(&self, item: &str, top_n: usize) -> Vec<String>;
}

/// Lookup that never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSimilarity;

impl SimilarityLookup for NoSimilarity {
    fn similar_items(&self, _item: &str, _top_n: usize) -> Vec<String> {
        Vec::new()
    }
}

pub struct TfIdfSimilarity {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// One L2-normalised TF-IDF row per item.
    vectors: Array2<f64>,
}

impl TfIdfSimilarity {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let ids: Vec<String> = catalog.items().iter().map(|i| i.id.clone()).collect();
        let documents: Vec<Vec<String>> = ids.iter().map(|id| tokenize(id)).collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        for token in documents.iter().flatten() {
            let next = vocabulary.len();
            vocabulary.entry(token.clone()).or_insert(next);
        }

        let n_docs = documents.len();
        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let mut seen: Vec<usize> = doc.iter().map(|t| vocabulary[t]).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                document_frequency[term] += 1;
            }
        }
        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let idf: Array1<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut vectors = Array2::<f64>::zeros((n_docs, vocabulary.len()));
        for (row, doc) in documents.iter().enumerate() {
            for token in doc {
                vectors[[row, vocabulary[token]]] += 1.0;
            }
            let mut vector = vectors.row_mut(row);
            vector *= &idf;
            let norm = vector.dot(&vector).sqrt();
            if norm > 0.0 {
                vector /= norm;
            }
        }

        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            ids,
            index,
            vectors,
        }
    }
}

impl SimilarityLookup for TfIdfSimilarity {
    fn similar_items(&self, item: &str, top_n: usize) -> Vec<String> {
        let Some(&query) = self.index.get(item) else {
            return Vec::new();
        };
        let scores = self.vectors.dot(&self.vectors.row(query));

        let mut ranked: Vec<(usize, f64)> = scores
            .iter()
            .enumerate()
            .filter(|&(i, &score)| i != query && score > 0.0)
            .map(|(i, &score)| (i, score))
            .collect();
        // Stable: equal scores keep catalog order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .take(top_n)
            .map(|(i, _)| self.ids[i].clone())
            .collect()
    }
}

/// Lower-cased alphanumeric words of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MenuDefinition;

    fn lookup() -> TfIdfSimilarity {
        TfIdfSimilarity::from_catalog(&MenuDefinition::reference().catalog().unwrap())
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Phulkha (3 pcs)"), vec!["phulkha", "pcs"]);
        assert_eq!(tokenize("Chicken 65"), vec!["chicken", "65"]);
    }

    #[test]
    fn test_excludes_query_and_respects_top_n() {
        let lookup = lookup();
        let similar = lookup.similar_items("Egg Curry", 3);
        assert_eq!(similar.len(), 3);
        assert!(!similar.contains(&"Egg Curry".to_string()));
        // Shares both tokens
        assert_eq!(similar[0], "Single Egg Curry");
    }

    #[test]
    fn test_similar_names_share_tokens() {
        let lookup = lookup();
        let similar = lookup.similar_items("Onion Dosa", 2);
        assert!(
            similar.contains(&"Onion Uthapam".to_string())
                || similar.contains(&"Plain Dosa".to_string())
        );
        for name in &similar {
            let lower = name.to_lowercase();
            assert!(lower.contains("onion") || lower.contains("dosa"));
        }
    }

    #[test]
    fn test_unknown_item_and_no_overlap() {
        let lookup = lookup();
        assert!(lookup.similar_items("Pizza", 3).is_empty());
        // "Roti" also appears in "Butter Roti" only
        assert_eq!(lookup.similar_items("Roti", 5), vec!["Butter Roti"]);
    }

    #[test]
    fn test_no_similarity() {
        assert!(NoSimilarity.similar_items("Roti", 3).is_empty());
    }
}

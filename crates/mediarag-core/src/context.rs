use crate::types::Hit;

pub const SEPARATOR: &str = "\n";

/// Join the content of the first `limit` hits with newlines.
///
/// Order is preserved as given and duplicate passages are kept.
pub fn assemble(hits: &[Hit], limit: usize) -> String {
    hits.iter()
        .take(limit)
        .map(|h| h.content.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    fn hits(n: usize) -> Vec<Hit> {
        (0..n).map(|i| Hit::new(format!("passage {i}"), Some(i as i64), Origin::Vector)).collect()
    }

    #[test]
    fn empty_input_is_empty_string() {
        for limit in [0, 1, 10] {
            assert_eq!(assemble(&[], limit), "");
        }
    }

    #[test]
    fn takes_min_of_limit_and_len_in_order() {
        for (n, limit) in [(3, 10), (12, 10), (5, 5), (4, 0), (1, 1)] {
            let ctx = assemble(&hits(n), limit);
            let expected: Vec<String> = (0..n.min(limit)).map(|i| format!("passage {i}")).collect();
            if expected.is_empty() {
                assert_eq!(ctx, "");
            } else {
                assert_eq!(ctx.split(SEPARATOR).collect::<Vec<_>>(), expected);
            }
        }
    }

    #[test]
    fn duplicates_are_preserved() {
        let dup = vec![
            Hit::new("CO2 rises", Some(1), Origin::Vector),
            Hit::new("CO2 rises", Some(1), Origin::FullText),
        ];
        assert_eq!(assemble(&dup, 10), "CO2 rises\nCO2 rises");
    }
}

use rand::Rng;

/// Number of draws for the random-picks / related-products rails.
pub const WIDGET_DRAWS: usize = 51;

/// Draw `draws` independent uniform indices over `[0, bound)`. Duplicates
/// are allowed and results are not reproducible across calls. A zero bound
/// yields an empty list rather than an unusable index.
pub fn sample_indices(draws: usize, bound: usize) -> Vec<usize> {
    if bound == 0 {
        return Vec::new();
    }
    let mut rng = rand::rng();
    (0..draws).map(|_| rng.random_range(0..bound)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_the_requested_number_of_indices() {
        assert_eq!(sample_indices(WIDGET_DRAWS, 10).len(), WIDGET_DRAWS);
    }

    #[test]
    fn indices_stay_in_range() {
        for index in sample_indices(1000, 7) {
            assert!(index < 7);
        }
    }

    #[test]
    fn zero_bound_yields_no_indices() {
        assert!(sample_indices(WIDGET_DRAWS, 0).is_empty());
    }

    #[test]
    fn single_element_bound_always_picks_zero() {
        assert!(sample_indices(20, 1).iter().all(|&i| i == 0));
    }
}

use super::error::ProjectionError;

const FIRST_AGE: u32 = 72;

/// IRS uniform lifetime table (Publication 590-B), indexed from age 72.
const UNIFORM_LIFETIME_DIVISORS: [f64; 29] = [
    27.4, 26.5, 25.5, 24.6, 23.7, 22.9, 22.0, 21.1, 20.2, 19.4, // 72-81
    18.5, 17.7, 16.8, 16.0, 15.2, 14.4, 13.7, 12.9, 12.2, 11.5, // 82-91
    10.8, 10.1, 9.5, 8.9, 8.4, 7.8, 7.3, 6.8, 6.4, // 92-100
];

pub fn rmd_divisor(age: u32) -> Result<f64, ProjectionError> {
    age.checked_sub(FIRST_AGE)
        .and_then(|idx| UNIFORM_LIFETIME_DIVISORS.get(idx as usize))
        .copied()
        .ok_or(ProjectionError::OutOfRange { age })
}

pub fn required_minimum_distribution(pretax_balance: f64, age: u32) -> Result<f64, ProjectionError> {
    let divisor = rmd_divisor(age)?;
    Ok(pretax_balance.max(0.0) / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn divisor_matches_published_table() {
        assert_abs_diff_eq!(rmd_divisor(72).unwrap(), 27.4);
        assert_abs_diff_eq!(rmd_divisor(75).unwrap(), 24.6);
        assert_abs_diff_eq!(rmd_divisor(85).unwrap(), 16.0);
        assert_abs_diff_eq!(rmd_divisor(100).unwrap(), 6.4);
    }

    #[test]
    fn divisor_outside_table_is_out_of_range() {
        assert_eq!(rmd_divisor(71), Err(ProjectionError::OutOfRange { age: 71 }));
        assert_eq!(rmd_divisor(101), Err(ProjectionError::OutOfRange { age: 101 }));
        assert_eq!(rmd_divisor(0), Err(ProjectionError::OutOfRange { age: 0 }));
    }

    #[test]
    fn divisors_shrink_with_age() {
        for age in 73..=100 {
            assert!(rmd_divisor(age).unwrap() < rmd_divisor(age - 1).unwrap());
        }
    }

    #[test]
    fn rmd_divides_balance_and_ignores_negative_balance() {
        assert_abs_diff_eq!(
            required_minimum_distribution(246_000.0, 75).unwrap(),
            10_000.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(required_minimum_distribution(-5.0, 75).unwrap(), 0.0);
    }
}

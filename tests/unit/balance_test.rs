//! Unit tests for base-unit amounts and the balance validator

mod balance_tests {
    use cropcircle::balance::{format_units, parse_units, BalanceValidator};
    use cropcircle::types::TOKEN_DECIMALS;

    const WAD: u128 = 1_000_000_000_000_000_000;

    /// "500" human units at 10^18 scaling is 500 * 10^18 base units;
    /// against a 400-token pool the check is insufficient.
    #[test]
    fn human_amount_scales_and_compares_in_base_units() {
        let required = parse_units("500", TOKEN_DECIMALS).unwrap();
        assert_eq!(required, 500 * WAD);

        let check = BalanceValidator::new().check(400 * WAD, required);
        assert!(!check.sufficient);
        assert_eq!(check.shortfall, 100 * WAD);
        assert_eq!(check.pool_display, "400.00");
        assert_eq!(check.required_display, "500.00");
    }

    /// For required amounts exactly divisible by the scaling factor the
    /// integer comparison and the human-readable-division comparison
    /// agree (e.g. required = 100 * 10^18).
    #[test]
    fn integer_and_display_comparisons_agree_on_exact_multiples() {
        let validator = BalanceValidator::new();
        let required = 100 * WAD;
        for pool_tokens in [0u128, 99, 100, 101, 10_000] {
            let check = validator.check(pool_tokens * WAD, required);
            let pool_display: f64 = check.pool_display.parse().unwrap();
            let required_display: f64 = check.required_display.parse().unwrap();
            assert_eq!(
                check.sufficient,
                pool_display >= required_display,
                "divergence at pool={pool_tokens}"
            );
        }
    }

    #[test]
    fn fractional_amounts_stay_exact() {
        assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), 1);
        assert_eq!(parse_units("123.456", 18).unwrap(), 123_456 * WAD / 1_000);
    }

    #[test]
    fn formatting_is_display_only_and_truncates() {
        // 0.999 renders as 0.99; the integer value is untouched.
        let raw = 999 * WAD / 1_000;
        assert_eq!(format_units(raw, TOKEN_DECIMALS), "0.99");
        assert!(raw < WAD);
    }

    #[test]
    fn equal_balances_are_sufficient() {
        let check = BalanceValidator::new().check(100 * WAD, 100 * WAD);
        assert!(check.sufficient);
        assert_eq!(check.shortfall, 0);
    }
}

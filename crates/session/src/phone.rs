/// Phone variants tried against the membership roster, in match priority
/// order: the number as given, the digits-only country-code-normalized form,
/// then the last-10-digit suffix. The roster takes the first that matches.
pub fn phone_variants(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![trimmed.to_string()];

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        push_unique(&mut variants, digits.clone());
    }

    if digits.len() > 10 {
        push_unique(&mut variants, digits[digits.len() - 10..].to_string());
    }

    variants
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

/// True when a roster phone field matches any of the caller's variants,
/// comparing digits-only suffixes the same way the variant list is built.
pub fn matches_variant(roster_phone: &str, variants: &[String]) -> bool {
    let roster_trimmed = roster_phone.trim();
    let roster_digits: String = roster_trimmed.chars().filter(char::is_ascii_digit).collect();

    variants.iter().any(|variant| {
        if variant == roster_trimmed {
            return true;
        }
        let variant_digits: String = variant.chars().filter(char::is_ascii_digit).collect();
        if variant_digits.is_empty() || roster_digits.is_empty() {
            return false;
        }
        variant_digits == roster_digits
            || (variant_digits.len() == 10 && roster_digits.ends_with(&variant_digits))
            || (roster_digits.len() == 10 && variant_digits.ends_with(&roster_digits))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variants_cover_exact_digits_and_suffix() {
        let variants = phone_variants("+1 (555) 123-4567");
        assert_eq!(
            variants,
            vec![
                "+1 (555) 123-4567".to_string(),
                "15551234567".to_string(),
                "5551234567".to_string(),
            ]
        );
    }

    #[test]
    fn short_numbers_have_no_suffix_variant() {
        let variants = phone_variants("5551234567");
        assert_eq!(variants, vec!["5551234567".to_string()]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(phone_variants("   ").is_empty());
    }

    #[test]
    fn roster_matching_ignores_formatting() {
        let variants = phone_variants("+1 555-123-4567");
        assert!(matches_variant("15551234567", &variants));
        assert!(matches_variant("(555) 123 4567", &variants));
        assert!(matches_variant("+1 (555) 123-4567", &variants));
        assert!(!matches_variant("15551239999", &variants));
    }

    #[test]
    fn suffix_match_bridges_country_codes() {
        // Caller stored without country code, roster with one.
        let variants = phone_variants("555 123 4567");
        assert!(matches_variant("+1 555 123 4567", &variants));
    }
}

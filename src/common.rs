//! Small text normalization helpers shared by the services.

/// Uppercase the first character, leaving the rest untouched.
///
/// Product and category names are stored capitalized; person names go through
/// a lowercase pass first (see the customer/supplier services).
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Trim and capitalize, used for product/category display fields.
pub fn normalize_title(value: &str) -> String {
    capitalize(value.trim())
}

/// Trim, lowercase, then capitalize. Used for person names so that
/// "mcLEAN" stores as "Mclean".
pub fn normalize_person_name(value: &str) -> String {
    capitalize(&value.trim().to_lowercase())
}

/// Trim and lowercase, used for email addresses.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_keeps_rest_of_string() {
        assert_eq!(capitalize("t-shirt"), "T-shirt");
        assert_eq!(capitalize("BEER"), "BEER");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn normalize_title_trims_first() {
        assert_eq!(normalize_title("  winter jacket "), "Winter jacket");
    }

    #[test]
    fn person_names_are_lowercased_before_capitalizing() {
        assert_eq!(normalize_person_name("  McLEAN "), "Mclean");
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(normalize_email(" Bob@Example.COM "), "bob@example.com");
    }
}

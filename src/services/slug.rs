use uuid::Uuid;

/// Lowercase, collapse whitespace runs into '-', drop anything that is not
/// alphanumeric or '-'.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut in_space = false;

    for c in input.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_alphanumeric() || c == '-' {
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

/// Publication slugs carry an id prefix so equal titles stay unique
pub fn publication_slug(title: &str, id: Uuid) -> String {
    let simple = id.simple().to_string();
    let suffix = &simple[..8];
    let base = slugify(title);
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{}-{}", base, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Trade Policy"), "trade-policy");
        assert_eq!(slugify("  Fiscal   Outlook 2025! "), "fiscal-outlook-2025");
        assert_eq!(slugify("Labor & Wages"), "labor--wages");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn publication_slug_appends_id_prefix() {
        let id = Uuid::parse_str("1b4e28ba-2fa1-11d2-883f-0016d3cca427").unwrap();
        assert_eq!(publication_slug("Tax Reform Brief", id), "tax-reform-brief-1b4e28ba");
        assert_eq!(publication_slug("!!!", id), "1b4e28ba");
    }
}

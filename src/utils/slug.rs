use chrono::Utc;

/// Build a URL slug from a title.
///
/// Turkish characters are transliterated before the generic pass so that
/// "Ramazan Umresi Özel" becomes "ramazan-umresi-ozel" rather than losing
/// letters. Consecutive separators collapse to a single '-'.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true; // suppress a leading dash

    for c in title.chars() {
        let mapped: Option<char> = match c {
            'ç' | 'Ç' => Some('c'),
            'ğ' | 'Ğ' => Some('g'),
            'ı' | 'İ' => Some('i'),
            'ö' | 'Ö' => Some('o'),
            'ş' | 'Ş' => Some('s'),
            'ü' | 'Ü' => Some('u'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        };

        match mapped {
            Some(c) => {
                slug.push(c);
                last_was_dash = false;
            }
            None if !last_was_dash => {
                slug.push('-');
                last_was_dash = true;
            }
            None => {}
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Slug retried after a unique-constraint conflict. The timestamp suffix is
/// chosen by the database round trip that failed, so two concurrent inserts
/// with the same title cannot both win the plain slug; the loser retries with
/// this one.
pub fn slug_with_suffix(base: &str) -> String {
    format!("{}-{}", base, Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(slugify("Umre Turu 2026"), "umre-turu-2026");
        assert_eq!(slugify("  Hac   Kayıtları  "), "hac-kayitlari");
    }

    #[test]
    fn turkish_characters_are_transliterated() {
        assert_eq!(slugify("Ramazan Umresi Özel"), "ramazan-umresi-ozel");
        assert_eq!(slugify("Şile & Ağva Günübirlik"), "sile-agva-gunubirlik");
        assert_eq!(slugify("İstanbul Çıkışlı"), "istanbul-cikisli");
    }

    #[test]
    fn punctuation_collapses_to_single_dash() {
        assert_eq!(slugify("Tur -- (15 Gün!)"), "tur-15-gun");
    }

    #[test]
    fn suffix_produces_distinct_slug() {
        let base = slugify("Umre Turu");
        let suffixed = slug_with_suffix(&base);
        assert!(suffixed.starts_with("umre-turu-"));
        assert_ne!(suffixed, base);
    }
}

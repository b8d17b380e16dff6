use unicode_segmentation::UnicodeSegmentation;

/// Latin spelling for a lowercase letter outside `[a-z]`, `None` when the
/// letter has no mapping and should act as a separator.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' | 'і' => "i",
        'ї' => "yi",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(latin)
}

/// Normalise a display name into an identifier made of `[a-z0-9_]`
///
/// Letters are lowercased and transliterated, everything else becomes `_`,
/// runs of `_` collapse to one and leading/trailing `_` are dropped.
/// Combining marks are ignored by looking only at the base character of each
/// grapheme. Returns an empty string when nothing survives.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for grapheme in name.graphemes(true) {
        let Some(base) = grapheme.chars().next() else {
            continue;
        };
        for lower in base.to_lowercase() {
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                slug.push(lower);
            } else if let Some(latin) = transliterate(lower) {
                slug.push_str(latin);
            } else if !slug.ends_with('_') {
                slug.push('_');
            }
        }
    }
    slug.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Classic Manicure"), "classic_manicure");
        assert_eq!(slugify("  Gel -- polish!! "), "gel_polish");
        assert_eq!(slugify("Spa 2 in 1"), "spa_2_in_1");
    }

    #[test]
    fn test_slugify_cyrillic() {
        assert_eq!(slugify("Маникюр классический"), "manikyur_klassicheskiy");
        assert_eq!(slugify("Снятие гель-лака"), "snyatie_gel_laka");
    }

    #[test]
    fn test_slugify_combining_marks_dropped() {
        assert_eq!(slugify("Cafe\u{301} nails"), "cafe_nails");
        assert_eq!(slugify("Café"), "cafe");
    }

    #[test]
    fn test_slugify_nothing_left() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("💅"), "");
    }
}

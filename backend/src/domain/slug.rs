//! URL slug helpers for location and specialty paths.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, underscores, and hyphens. Distinct inputs may collide
//! (`"São Paulo"` and `"Sao-Paulo"` share a slug); callers accept that.

/// Portuguese connectors kept lowercase when a slug is turned back into a label.
const LOWERCASE_CONNECTORS: [&str; 6] = ["de", "da", "do", "das", "dos", "e"];

/// Derive a URL slug from free text.
///
/// Diacritics are folded to ASCII, letters are lowercased, whitespace runs
/// become one hyphen, and anything outside `[a-z0-9_-]` is dropped.
///
/// # Examples
/// ```
/// use telesaude::domain::slug::slugify;
///
/// assert_eq!(slugify("São Paulo"), "sao-paulo");
/// assert_eq!(slugify(&slugify("  Ribeirão   Preto ")), "ribeirao-preto");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(fold_diacritic) {
        let ch = ch.to_ascii_lowercase();
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
            continue;
        }
        if pending_hyphen {
            slug.push('-');
            pending_hyphen = false;
        }
        slug.push(ch);
    }

    slug
}

/// Return `true` when `value` is already a valid slug.
#[must_use]
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}

/// Best-effort human label for a slug.
///
/// Accents lost by [`slugify`] cannot be recovered here; callers that know
/// the canonical spelling (the capitals gazetteer, the specialty catalogue)
/// should prefer it.
///
/// # Examples
/// ```
/// use telesaude::domain::slug::deslugify;
///
/// assert_eq!(deslugify("sao-jose-dos-campos"), "Sao Jose dos Campos");
/// ```
#[must_use]
pub fn deslugify(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(index, word)| {
            if index > 0 && LOWERCASE_CONNECTORS.contains(&word) {
                word.to_owned()
            } else {
                capitalise(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Fold one character to its unaccented ASCII form.
///
/// Covers the Latin-1 supplement and the Latin Extended-A letters that show
/// up in Brazilian place and specialty names. Other characters pass through.
fn fold_diacritic(ch: char) -> impl Iterator<Item = char> {
    let folded: &'static str = match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ª' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Č' => "C",
        'ç' | 'ć' | 'č' => "c",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => "I",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ñ' | 'ń' | 'ň' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' | 'º' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ý' | 'Ÿ' => "Y",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        'Š' => "S",
        'š' => "s",
        'Ž' => "Z",
        'ž' => "z",
        _ => "",
    };
    let passthrough = folded.is_empty().then_some(ch);
    folded.chars().chain(passthrough)
}
